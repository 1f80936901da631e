//! Responses the gate produces on its own.
//!
//! # Design Decisions
//! - Body is the standard reason phrase only; no detail about why the
//!   lookup failed or which ACL denied the request leaks to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Plain response carrying `status` and its canonical reason phrase.
pub fn status_response(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}

/// 500 for requests whose source address could not be determined.
pub fn internal_error() -> Response {
    status_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// 401 for denied requests when no deny handler is configured.
pub fn unauthorized() -> Response {
    status_response(StatusCode::UNAUTHORIZED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bodies_are_reason_phrases() {
        let res = unauthorized();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Unauthorized");

        let res = internal_error();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Internal Server Error");
    }
}
