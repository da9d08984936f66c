use thiserror::Error;

/// Errors raised while serving a request. Query validation problems are not
/// here: those render inline on the screen that caused them.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Internal Server Error: {0}")]
    Internal(String),
}
