use std::io;

use thiserror::Error;

use crate::envelope::ResponseCode;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// No bearer token in session storage.
    #[error("Session expired. Please log in again.")]
    MissingSession,
    /// Local input rejected before any request was made.
    #[error("{0}")]
    Input(String),
    /// `/auth/token` answered with anything but 200.
    #[error("Invalid username or password.")]
    InvalidCredentials,
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
    /// The server answered outside the 2xx range.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// Well-formed envelope carrying a non-success code.
    #[error("{message}")]
    Business { code: ResponseCode, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    /// The completion belongs to a request that was superseded or cancelled.
    #[error("request cancelled")]
    Cancelled,
    #[error("unknown console module `{0}`")]
    UnknownModule(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ConsoleError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConsoleError::Cancelled)
    }

    /// Text for the error toast, or `None` when the failure must stay silent.
    pub fn toast_message(&self) -> Option<String> {
        match self {
            ConsoleError::Cancelled => None,
            ConsoleError::Status { status, message } if message.trim().is_empty() => {
                Some(format!("Request failed with status {status}."))
            }
            other => Some(other.to_string()),
        }
    }
}

impl From<ConsoleError> for String {
    fn from(err: ConsoleError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_errors_are_silent() {
        assert_eq!(ConsoleError::Cancelled.toast_message(), None);
        assert!(ConsoleError::Cancelled.is_cancelled());
    }

    #[test]
    fn business_errors_toast_the_server_message() {
        let err = ConsoleError::Business {
            code: ResponseCode::Fail,
            message: "Equipment type already exists".to_string(),
        };
        assert_eq!(
            err.toast_message().as_deref(),
            Some("Equipment type already exists")
        );
    }

    #[test]
    fn empty_status_message_falls_back_to_status_code() {
        let err = ConsoleError::Status {
            status: 502,
            message: "  ".to_string(),
        };
        assert_eq!(
            err.toast_message().as_deref(),
            Some("Request failed with status 502.")
        );
    }
}
