//! Error types for the entra-user-check application.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Problems with the invocation event.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("No event with parameter 'username' provided")]
    MissingUsername,

    #[error("Event is not valid JSON: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("Failed to read event: {0}")]
    Io(#[from] std::io::Error),
}

/// Missing identity-provider credentials.
#[derive(Error, Debug)]
pub enum CredentialsError {
    /// A required credential variable is unset. `variable` names it; the message does not.
    #[error("Please set MICROSOFT_API_CREDENTIALS as env variables")]
    Missing { variable: &'static str },
}

/// Token acquisition errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Token endpoint returned HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("Failed to parse token response: {0}")]
    ParseFailed(String),
}

/// Directory (Graph) API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Graph API request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Graph API returned HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),
}

impl AppError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether the error was already reported where it was detected.
    ///
    /// Non-200 responses log status, headers and body in the client, and the
    /// guard failures log their fixed message in the check flow.
    pub fn already_logged(&self) -> bool {
        matches!(
            self,
            Self::Input(InputError::MissingUsername)
                | Self::Credentials(_)
                | Self::Auth(AuthError::UnexpectedStatus(_))
                | Self::Api(ApiError::UnexpectedStatus(_))
        )
    }
}
