use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocuSealApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("DocuSeal API credentials are not configured: {0}")]
    Configuration(String),
    #[error("Invalid envelope request: {0}")]
    Validation(String),
    #[error("Could not send request: {0}")]
    RequestError(String),
    #[error("Invalid response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Envelope creation failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
