use derive_more::Display;
use error_stack::Report;
use std::error::Error;

pub type ESResult<T, E> = Result<T, Report<E>>;

#[derive(Debug, Display)]
pub enum JvmError {
    /// Error from user input.
    #[display("User error")]
    UserError,
    /// Error from APIs, OS, etc.
    #[display("An unexpected error occurred")]
    Unexpected,
}

impl Error for JvmError {}

/// Message for the user. Attached when the error is a [`JvmError::UserError`].
#[derive(Debug)]
pub struct UserMessage {
    pub message: String,
}
