use huddle_api::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("auth {0}")]
    Auth(String),
    #[error("validation {0}")]
    Validation(String),
    #[error("upload {0}")]
    Upload(String),
    #[error("persistence {0}")]
    Persistence(String),
    #[error("not found")]
    NotFound,
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err.to_string())
    }
}
