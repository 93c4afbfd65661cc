use derive_more::{AsRef, Display};

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Title(String);

impl Title {
    pub fn new(title: &str) -> Result<Self, TitleError> {
        let trimmed_title = title.trim();

        if trimmed_title.is_empty() {
            return Err(TitleError::Empty);
        }

        let len = trimmed_title.chars().count();

        if len > 128 {
            return Err(TitleError::TooLong(len));
        }

        Ok(Title(trimmed_title.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TitleError {
    #[error("Title must not be empty")]
    Empty,
    #[error("Title must be 128 characters or fewer ({0} > 128)")]
    TooLong(usize),
}
