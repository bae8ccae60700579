//! Submission content types and post rendering.

use std::fmt;

use crate::config::Category;

/// Caption used when a photo or video arrives without one.
pub const MISSING_CAPTION: &str = "Без подписи";

/// Stable Telegram user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of content a user can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Text,
    Photo,
    Video,
}

impl ContentType {
    /// All content types in menu order.
    pub const ALL: [Self; 3] = [Self::Text, Self::Photo, Self::Video];

    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }

    /// Word used in the attribution line of a rendered post.
    const fn attribution(self) -> &'static str {
        match self {
            Self::Text => "Текст",
            Self::Photo => "Фото",
            Self::Video => "Видео",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw content captured from a user, before tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text {
        body: String,
    },
    Photo {
        /// Transport file reference.
        media: String,
        caption: Option<String>,
    },
    Video {
        /// Transport file reference.
        media: String,
        caption: Option<String>,
    },
}

impl Content {
    /// Returns the content type of this content.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::Text { .. } => ContentType::Text,
            Self::Photo { .. } => ContentType::Photo,
            Self::Video { .. } => ContentType::Video,
        }
    }
}

/// Content accepted from a user and waiting for a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub content: Content,

    /// Display name used for attribution.
    pub submitter_name: String,
}

impl PendingSubmission {
    /// Renders the final post: attribution, body, hashtag and the call-to-action link.
    #[must_use]
    pub fn render(self, category: &Category, bot_username: &str) -> Post {
        let kind = self.content.content_type().attribution();
        let header = format!("{kind} от <b>{}</b>:", escape_html(&self.submitter_name));
        let footer = format!(
            "{}\n\n<a href=\"https://t.me/{bot_username}\">Добавить свой лайфхак</a>",
            category.hashtag()
        );
        let compose = |body: &str| format!("{header}\n\n{}\n\n{footer}", escape_html(body));

        match self.content {
            Content::Text { body } => Post::Text(compose(&body)),
            Content::Photo { media, caption } => Post::Photo {
                media,
                caption: compose(caption.as_deref().unwrap_or(MISSING_CAPTION)),
            },
            Content::Video { media, caption } => Post::Video {
                media,
                caption: compose(caption.as_deref().unwrap_or(MISSING_CAPTION)),
            },
        }
    }
}

/// A rendered post, ready for the moderator and the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Post {
    Text(String),
    Photo { media: String, caption: String },
    Video { media: String, caption: String },
}

impl Post {
    /// Returns the content type of this post.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::Text(_) => ContentType::Text,
            Self::Photo { .. } => ContentType::Photo,
            Self::Video { .. } => ContentType::Video,
        }
    }

    /// Text body or caption.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Photo { caption, .. } | Self::Video { caption, .. } => caption,
        }
    }
}

/// Escapes user input for Telegram HTML parse mode.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(content: Content) -> PendingSubmission {
        PendingSubmission {
            content,
            submitter_name: "Anna".to_owned(),
        }
    }

    #[test]
    fn test_render_text() {
        let post = pending(Content::Text {
            body: "Use a fork".to_owned(),
        })
        .render(&Category::new("быт"), "TestBot");

        assert_eq!(
            post,
            Post::Text(
                "Текст от <b>Anna</b>:\n\nUse a fork\n\n#быт\n\n\
                 <a href=\"https://t.me/TestBot\">Добавить свой лайфхак</a>"
                    .to_owned()
            )
        );
    }

    #[test]
    fn test_render_photo_keeps_media() {
        let post = pending(Content::Photo {
            media: "file-1".to_owned(),
            caption: Some("nice".to_owned()),
        })
        .render(&Category::new("food"), "TestBot");

        let Post::Photo { media, caption } = post else {
            panic!("expected a photo post");
        };
        assert_eq!(media, "file-1");
        assert!(caption.starts_with("Фото от <b>Anna</b>:"));
        assert!(caption.contains("nice"));
        assert!(caption.contains("#food"));
    }

    #[test]
    fn test_render_video_without_caption() {
        let post = pending(Content::Video {
            media: "file-2".to_owned(),
            caption: None,
        })
        .render(&Category::new("город"), "TestBot");

        assert_eq!(post.content_type(), ContentType::Video);
        assert!(post.text().contains(MISSING_CAPTION));
    }

    #[test]
    fn test_render_escapes_user_input() {
        let post = PendingSubmission {
            content: Content::Text {
                body: "1 < 2 & 3 > 2".to_owned(),
            },
            submitter_name: "<script>".to_owned(),
        }
        .render(&Category::new("другое"), "TestBot");

        assert!(post.text().contains("<b>&lt;script&gt;</b>"));
        assert!(post.text().contains("1 &lt; 2 &amp; 3 &gt; 2"));
    }
}
