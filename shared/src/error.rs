use thiserror::Error;

pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Failure of a remote call or asset fetch as seen by the browser.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Non-success HTTP status, with the `error` text from the body if any.
    #[error("{}", rejected_message(.status, .message))]
    Rejected { status: u16, message: Option<String> },
    #[error("Could not reach the server: {0}")]
    Network(String),
    #[error("Unexpected response from the server: {0}")]
    Decode(String),
    #[error("Could not load the sample image: {0}")]
    Asset(String),
    #[error("Could not read \"{0}\". Please choose the file again.")]
    FileRead(String),
}

fn rejected_message(status: &u16, message: &Option<String>) -> String {
    match message.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => format!("{GENERIC_ERROR} (status {status})"),
    }
}

impl ServiceError {
    /// One-line text for the dismissible error banner.
    pub fn message(&self) -> String {
        match self {
            ServiceError::Rejected { .. } | ServiceError::Asset(_) | ServiceError::FileRead(_) => {
                self.to_string()
            }
            ServiceError::Network(_) | ServiceError::Decode(_) => GENERIC_ERROR.to_string(),
        }
    }
}
