use thiserror::Error;

/// Failures surfaced by the habit repository.
///
/// Cloneable so a single failure can be carried through a live query stream
/// and into a controller's view state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("No data found")]
    NotFound,
    #[error("{0}")]
    Persistence(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unexpected(String),
}

impl RepositoryError {
    /// Human-readable text for a view state, or `None` when the error carries
    /// no message of its own.
    pub fn message(&self) -> Option<String> {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            None
        } else {
            Some(msg)
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<anyhow::Error> for RepositoryError {
    fn from(e: anyhow::Error) -> Self {
        Self::Persistence(format!("{:#}", e))
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Unexpected(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_messages_are_treated_as_absent() {
        assert_eq!(
            RepositoryError::Persistence(String::new()).message(),
            None
        );
        assert_eq!(
            RepositoryError::NotFound.message().as_deref(),
            Some("No data found")
        );
    }
}
