use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum TokenServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for TokenServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => TokenServiceError::Invalid(msg),
            AppError::NotFound(_) => TokenServiceError::NotFound,
            _ => TokenServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<TokenServiceError> for AppError {
    fn from(err: TokenServiceError) -> Self {
        match err {
            TokenServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TokenServiceError::NotFound => AppError::NotFound("Account not found".to_string()),
            TokenServiceError::Dependency(msg) => AppError::StoreUnavailable(msg),
            TokenServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
