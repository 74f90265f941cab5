//! Error taxonomy for the spreadsheet store.

use thiserror::Error;

/// Failures raised by a [`crate::BookStore`] or while connecting to one.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no credentials found: neither '{file}' exists nor is 'credentials.gcp_json' set")]
    MissingCredentials { file: String },

    #[error("invalid service-account credentials: {0}")]
    InvalidCredentials(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid store configuration: {0}")]
    Configuration(String),

    #[error("spreadsheet '{0}' not found or not shared with the service account")]
    SpreadsheetNotFound(String),

    #[error("a book needs a title")]
    EmptyTitle,

    #[error("no book titled '{0}'")]
    TitleNotFound(String),

    #[error("request to the spreadsheet service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("spreadsheet service rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response from the spreadsheet service: {0}")]
    Decode(String),
}

impl StoreError {
    /// True for failures that mean no usable store handle exists.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            StoreError::MissingCredentials { .. }
                | StoreError::InvalidCredentials(_)
                | StoreError::Auth(_)
                | StoreError::Configuration(_)
                | StoreError::SpreadsheetNotFound(_)
        )
    }
}
