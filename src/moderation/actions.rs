//! Moderator actions and their callback payloads.

use std::fmt;

const APPROVE: &str = "approve";
const CHOOSE_REJECT_REASON: &str = "reject_choose_reason";
const REJECT_REASON_PREFIX: &str = "reject_reason_";

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Spam,
    LowQuality,
    OffTopic,
    Other,
    /// A reason payload this build does not know.
    Unspecified,
}

impl RejectReason {
    /// Reasons offered on the moderator keyboard, in display order.
    pub const OFFERED: [Self; 4] = [Self::Spam, Self::LowQuality, Self::OffTopic, Self::Other];

    const fn key(self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::LowQuality => "low_quality",
            Self::OffTopic => "offtopic",
            Self::Other => "other",
            Self::Unspecified => "unspecified",
        }
    }

    fn from_key(key: &str) -> Self {
        match key {
            "spam" => Self::Spam,
            "low_quality" => Self::LowQuality,
            "offtopic" => Self::OffTopic,
            "other" => Self::Other,
            _ => Self::Unspecified,
        }
    }

    /// Reason text sent to the submitter and echoed to the moderator.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Spam => "Спам или реклама",
            Self::LowQuality => "Запрещенный контент",
            Self::OffTopic => "Не по теме",
            Self::Other => "Другая причина",
            Self::Unspecified => "Причина не указана",
        }
    }

    /// Button label on the reasons keyboard.
    #[must_use]
    pub const fn button_label(self) -> &'static str {
        match self {
            Self::Spam => "❌ Спам/реклама",
            Self::LowQuality => "❌ Некачественный контент",
            Self::OffTopic => "❌ Не по теме",
            Self::Other | Self::Unspecified => "❌ Другое",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A button press on a moderation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeratorAction {
    /// Publish the submission.
    Approve,

    /// First reject step: show the reasons keyboard.
    ChooseRejectReason,

    /// Second reject step: reject with a concrete reason.
    Reject(RejectReason),
}

impl ModeratorAction {
    /// Parses callback data from a moderation keyboard.
    ///
    /// Returns `None` if the payload is not a moderator action.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        match data.trim() {
            APPROVE => Some(Self::Approve),
            CHOOSE_REJECT_REASON => Some(Self::ChooseRejectReason),
            other => other
                .strip_prefix(REJECT_REASON_PREFIX)
                .map(|key| Self::Reject(RejectReason::from_key(key))),
        }
    }

    /// Callback data carried by the button for this action.
    #[must_use]
    pub fn callback_data(self) -> String {
        match self {
            Self::Approve => APPROVE.to_owned(),
            Self::ChooseRejectReason => CHOOSE_REJECT_REASON.to_owned(),
            Self::Reject(reason) => format!("{REJECT_REASON_PREFIX}{}", reason.key()),
        }
    }
}

impl fmt::Display for ModeratorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("approve"),
            Self::ChooseRejectReason => f.write_str("choose reject reason"),
            Self::Reject(reason) => write!(f, "reject ({})", reason.key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("approve", Some(ModeratorAction::Approve))]
    #[case("reject_choose_reason", Some(ModeratorAction::ChooseRejectReason))]
    #[case("reject_reason_spam", Some(ModeratorAction::Reject(RejectReason::Spam)))]
    #[case("reject_reason_low_quality", Some(ModeratorAction::Reject(RejectReason::LowQuality)))]
    #[case("reject_reason_offtopic", Some(ModeratorAction::Reject(RejectReason::OffTopic)))]
    #[case("reject_reason_other", Some(ModeratorAction::Reject(RejectReason::Other)))]
    #[case("reject_reason_bogus", Some(ModeratorAction::Reject(RejectReason::Unspecified)))]
    #[case("hashtag_food", None)]
    #[case("", None)]
    fn test_parse(#[case] data: &str, #[case] expected: Option<ModeratorAction>) {
        assert_eq!(ModeratorAction::parse(data), expected);
    }

    #[test]
    fn test_offered_reasons_parse_back() {
        for reason in RejectReason::OFFERED {
            let data = ModeratorAction::Reject(reason).callback_data();
            assert_eq!(ModeratorAction::parse(&data), Some(ModeratorAction::Reject(reason)));
        }
    }

    #[test]
    fn test_spam_description() {
        assert_eq!(RejectReason::Spam.to_string(), "Спам или реклама");
    }

    #[test]
    fn test_low_quality_description() {
        assert_eq!(RejectReason::LowQuality.to_string(), "Запрещенный контент");
        assert_eq!(RejectReason::LowQuality.button_label(), "❌ Некачественный контент");
    }
}
