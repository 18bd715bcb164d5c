use crate::domain::tokens::TokenServiceError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum EntitlementServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for EntitlementServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => EntitlementServiceError::Invalid(msg),
            AppError::NotFound(_) => EntitlementServiceError::NotFound,
            _ => EntitlementServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<TokenServiceError> for EntitlementServiceError {
    fn from(err: TokenServiceError) -> Self {
        match err {
            TokenServiceError::Dependency(msg) => EntitlementServiceError::Dependency(msg),
            TokenServiceError::Invalid(msg) => EntitlementServiceError::Invalid(msg),
            TokenServiceError::NotFound => EntitlementServiceError::NotFound,
            TokenServiceError::Other(e) => EntitlementServiceError::Other(e),
        }
    }
}

impl From<EntitlementServiceError> for AppError {
    fn from(err: EntitlementServiceError) -> Self {
        match err {
            EntitlementServiceError::Invalid(msg) => AppError::BadRequest(msg),
            EntitlementServiceError::NotFound => {
                AppError::NotFound("Account not found".to_string())
            }
            EntitlementServiceError::Dependency(msg) => AppError::StoreUnavailable(msg),
            EntitlementServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
