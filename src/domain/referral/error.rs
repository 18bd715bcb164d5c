use crate::domain::tokens::TokenServiceError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ReferralServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for ReferralServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ReferralServiceError::Invalid(msg),
            AppError::NotFound(_) => ReferralServiceError::NotFound,
            _ => ReferralServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<TokenServiceError> for ReferralServiceError {
    fn from(err: TokenServiceError) -> Self {
        match err {
            TokenServiceError::Dependency(msg) => ReferralServiceError::Dependency(msg),
            TokenServiceError::Invalid(msg) => ReferralServiceError::Invalid(msg),
            TokenServiceError::NotFound => ReferralServiceError::NotFound,
            TokenServiceError::Other(e) => ReferralServiceError::Other(e),
        }
    }
}

impl From<ReferralServiceError> for AppError {
    fn from(err: ReferralServiceError) -> Self {
        match err {
            ReferralServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ReferralServiceError::NotFound => AppError::NotFound("Account not found".to_string()),
            ReferralServiceError::Dependency(msg) => AppError::StoreUnavailable(msg),
            ReferralServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
