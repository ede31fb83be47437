use crate::types::{SendMessageRequest, UserId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty field {0}")]
    Empty(&'static str),
    #[error("too long {0}")]
    TooLong(&'static str),
    #[error("history target is the caller")]
    SelfHistory,
}

#[derive(Clone, Debug)]
pub struct ValidationLimits {
    pub max_text_bytes: usize,
    pub max_filename_len: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_text_bytes: 64 * 1024,
            max_filename_len: 255,
        }
    }
}

pub fn validate_user_id(user: &UserId) -> Result<(), ValidationError> {
    if user.value.trim().is_empty() {
        return Err(ValidationError::Empty("userId"));
    }
    Ok(())
}

pub fn validate_send_request(
    req: &SendMessageRequest,
    limits: &ValidationLimits,
) -> Result<(), ValidationError> {
    if req.to_user_id.value.trim().is_empty() {
        return Err(ValidationError::Empty("toUserId"));
    }
    if req.text.as_deref().unwrap_or("").len() > limits.max_text_bytes {
        return Err(ValidationError::TooLong("text"));
    }
    if req.file_name.as_deref().unwrap_or("").len() > limits.max_filename_len {
        return Err(ValidationError::TooLong("fileName"));
    }
    Ok(())
}

pub fn validate_history_request(caller: &UserId, target: &UserId) -> Result<(), ValidationError> {
    validate_user_id(target)?;
    if caller == target {
        return Err(ValidationError::SelfHistory);
    }
    Ok(())
}
