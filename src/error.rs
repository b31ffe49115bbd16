use std::fmt::Display;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Classification shown to the user when an operation fails
///
/// Everything crossing the repository boundary is collapsed into one of these;
/// the underlying `AppError` is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Search, feed or enrichment failure of any kind
    General,
    /// Adding or removing a favorite could not be written
    FavoriteWrite,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::General => "Something went wrong, please try again.",
            ErrorCode::FavoriteWrite => "Your favorites could not be updated, please try again.",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&AppError> for ErrorCode {
    fn from(_: &AppError) -> Self {
        ErrorCode::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_app_error_collapses_to_general() {
        let errors = [
            AppError::InvalidInput("bad".to_string()),
            AppError::ExternalApi("502".to_string()),
            AppError::Internal("join".to_string()),
        ];

        for error in &errors {
            assert_eq!(ErrorCode::from(error), ErrorCode::General);
        }
    }

    #[test]
    fn test_error_code_display_uses_message() {
        assert_eq!(
            ErrorCode::General.to_string(),
            "Something went wrong, please try again."
        );
        assert_ne!(ErrorCode::FavoriteWrite.message(), ErrorCode::General.message());
    }
}
