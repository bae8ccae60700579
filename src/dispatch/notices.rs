//! User- and moderator-facing message texts.

use crate::config::LimitSettings;
use crate::moderation::RejectReason;
use crate::submission::{ContentType, SubmissionError, ValidationError};

pub const WELCOME: &str = "Привет! 👋\n\
    Ты попал в бот канала «Лайфхаки со всего света» 🌍\n\n\
    Здесь собираются лучшие трюки, советы и находки от людей со всего мира.\n\n\
    Хочешь поделиться своим лайфхаком?\n\n\
    Отправляй:\n\
    — Короткие видео (до 1 мин) 🎥\n\
    — Фото с комментарием 📸\n\
    — Просто текст (если лень снимать) ✍️";

pub const MAIN_MENU: &str = "Ты вернулся в главное меню. Выбери, что хочешь отправить:";
pub const CHOICE_PLACEHOLDER: &str = "Выберите тип контента";
pub const STARTUP: &str = "Бот запущен ✅";

pub const SUBMIT_FIRST: &str = "Сначала отправьте контент.";
pub const UNKNOWN_CATEGORY: &str = "Такой рубрики нет.";
pub const CATEGORY_CHOSEN: &str = "Рубрика выбрана.";
pub const SUBMITTED: &str = "✅ Спасибо! Ваш лайфхак уже в пути.";
pub const SEND_FAILED: &str = "❌ Ошибка при отправке. Попробуйте ещё раз.";

pub const NOT_FOUND: &str = "Контент не найден или уже обработан.";
pub const UNKNOWN_ACTION: &str = "Неизвестное действие.";
pub const PUBLISHED: &str = "✅ Опубликовано в канал.";
pub const PUBLISHED_TOAST: &str = "Опубликовано.";
pub const PUBLISHED_TO_USER: &str = "✅ Ваш лайфхак опубликован в канале. Спасибо за участие!";
pub const PUBLISH_FAILED: &str = "❌ Не удалось опубликовать в канал. Подробности в логах.";
pub const ACTION_FAILED: &str = "❌ Не удалось выполнить действие. Подробности в логах.";
pub const REJECTED_TOAST: &str = "Отклонено.";
pub const NOTIFY_FAILED: &str = "⚠️ Не удалось уведомить автора. Подробности в логах.";

/// Prompt shown after a content type is chosen.
#[must_use]
pub fn prompt(content_type: ContentType, limits: &LimitSettings) -> String {
    match content_type {
        ContentType::Text => format!("✍️ Напиши свой лайфхак (до {} знаков):", limits.text_char_limit),
        ContentType::Photo => "📸 Отправь фото с комментарием:".to_owned(),
        ContentType::Video => "🎥 Отправь короткое видео (до 1 мин):".to_owned(),
    }
}

/// Prompt asking for a category after content is staged.
#[must_use]
pub const fn category_prompt(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Text => "📌 Выберите рубрику для своего лайфхака:",
        ContentType::Photo => "📌 Выберите рубрику для фото:",
        ContentType::Video => "📌 Выберите рубрику для видео:",
    }
}

/// Notice explaining a refused submission step.
#[must_use]
pub fn submission_error(err: &SubmissionError, limits: &LimitSettings) -> String {
    match err {
        SubmissionError::RateLimitExceeded(content_type) => format!(
            "❌ Вы достигли лимита. Разрешено до {} постов этого типа каждые {} часов.",
            limits.quota(*content_type),
            limits.window_hours()
        ),
        SubmissionError::ValidationFailed(ValidationError::TextTooLong { limit, .. }) => {
            format!("⚠️ Текст должен быть до {limit} знаков. Попробуйте снова.")
        }
        SubmissionError::ValidationFailed(ValidationError::WrongContentType { .. }) => {
            "⚠️ Это не тот тип контента. Пожалуйста, отправьте правильный.".to_owned()
        }
        SubmissionError::ValidationFailed(ValidationError::AlbumNotAllowed) => {
            "⚠️ Пожалуйста, отправьте только один файл, а не альбом.".to_owned()
        }
        SubmissionError::SubmissionNotFound => SUBMIT_FIRST.to_owned(),
        SubmissionError::SubmissionInProgress(_) => {
            "⚠️ Сначала отправьте выбранный контент или нажмите «⬅️ Назад».".to_owned()
        }
    }
}

/// Notice sent to the submitter on rejection.
#[must_use]
pub fn rejected_to_user(reason: RejectReason) -> String {
    format!("❌ Ваш лайфхак отклонён. Причина: {reason}")
}

/// Reply under the moderation message on rejection.
#[must_use]
pub fn rejected(reason: RejectReason) -> String {
    format!("❌ Отклонено. Причина: {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_notice_uses_settings() {
        let limits = LimitSettings {
            photo_quota: 3,
            ..LimitSettings::default()
        };
        let notice = submission_error(&SubmissionError::RateLimitExceeded(ContentType::Photo), &limits);
        assert!(notice.contains("до 3 постов"));
        assert!(notice.contains("12 часов"));
    }

    #[test]
    fn test_rejection_mentions_reason() {
        assert_eq!(
            rejected_to_user(RejectReason::Spam),
            "❌ Ваш лайфхак отклонён. Причина: Спам или реклама"
        );
    }
}
