use crate::errors::ServerError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use tracing::{info, warn};

pub type ResultResp = Result<Response, ServerError>;

/// Convert a ServerError into a proper HTML response
pub fn error_to_response(err: ServerError) -> Response {
    match err {
        ServerError::NotFound => html_error_response(404, "Not Found"),
        ServerError::BadRequest(msg) => {
            info!(message = %msg, "bad request");
            html_error_response(400, &msg)
        }
        ServerError::Internal(msg) => {
            warn!(message = %msg, "internal error");
            html_error_response(500, "Internal Server Error")
        }
    }
}

/// Build an HTML error page
pub fn html_error_response(status: u16, message: &str) -> Response {
    let page = error_page(status, message).into_string();

    match ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(page.clone()))
    {
        Ok(resp) => resp,
        Err(_) => Response::new(Body::from(page)),
    }
}
