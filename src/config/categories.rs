//! Category (hashtag) configuration and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CATEGORY_CALLBACK_PREFIX, MAX_CALLBACK_DATA_LEN};

/// Errors that can occur during category validation.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category at index {index} is empty")]
    Empty { index: usize },

    #[error("Category at index {index} ({tag}) contains whitespace or '#'")]
    InvalidCharacters { index: usize, tag: String },

    #[error("Category at index {index} ({tag}) is too long for callback data: {length} > {max_length} bytes")]
    TooLong {
        index: usize,
        tag: String,
        length: usize,
        max_length: usize,
    },

    #[error("Duplicate category tag found: {tag}")]
    DuplicateTag { tag: String },

    #[error("No categories configured")]
    NoCategories,

    #[error("Failed to read category file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse category file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A category a submission is filed under, rendered as a hashtag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Category {
    /// Hashtag text without the leading `#`.
    pub tag: String,
}

impl Category {
    /// Creates a new category from a tag without `#`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Hashtag as shown in posts and on buttons, e.g. `#еда`.
    #[must_use]
    pub fn hashtag(&self) -> String {
        format!("#{}", self.tag)
    }

    /// Inline button payload selecting this category.
    #[must_use]
    pub fn callback_data(&self) -> String {
        format!("{CATEGORY_CALLBACK_PREFIX}{}", self.tag)
    }

    fn check(&self, index: usize) -> Result<(), CategoryError> {
        if self.tag.is_empty() {
            return Err(CategoryError::Empty { index });
        }

        if self.tag.chars().any(|c| c.is_whitespace() || c == '#') {
            return Err(CategoryError::InvalidCharacters {
                index,
                tag: self.tag.clone(),
            });
        }

        let length = self.callback_data().len();
        if length > MAX_CALLBACK_DATA_LEN {
            return Err(CategoryError::TooLong {
                index,
                tag: self.tag.clone(),
                length,
                max_length: MAX_CALLBACK_DATA_LEN,
            });
        }

        Ok(())
    }
}

/// The set of categories users pick from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Categories in display order.
    pub categories: Vec<Category>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            categories: ["еда", "путешествия", "быт", "здоровье", "город", "другое", "простоЮмор"]
                .into_iter()
                .map(Category::new)
                .collect(),
        }
    }
}

impl CategoryConfig {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CategoryError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns the built-in list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, CategoryError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), CategoryError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates all categories.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), CategoryError> {
        self.validate_all().into_iter().collect()
    }

    /// Returns a validation result per category.
    #[must_use]
    pub fn validate_all(&self) -> Vec<Result<(), CategoryError>> {
        if self.categories.is_empty() {
            return vec![Err(CategoryError::NoCategories)];
        }

        let mut seen = std::collections::HashSet::new();

        self.categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                if !seen.insert(&category.tag) {
                    return Err(CategoryError::DuplicateTag {
                        tag: category.tag.clone(),
                    });
                }
                category.check(index)
            })
            .collect()
    }

    /// Finds a configured category by tag.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.tag == tag)
    }

    /// Returns the number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Checks if there are no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
