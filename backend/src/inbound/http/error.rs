//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and
//! status codes. Internal errors are logged with the active trace id and
//! redacted before leaving the process.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::{Value, json};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::{TRACE_ID_HEADER, TraceId};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the JSON body for an error response.
///
/// Internal failures keep their detail in the logs and leave the process as
/// a generic message; every payload carries the active trace id when one is
/// in scope so clients can quote it back.
fn payload(err: &Error) -> Value {
    let visible = if matches!(err.code(), ErrorCode::InternalError) {
        error!(detail = %err.message(), "internal error");
        Error::internal("Internal server error")
    } else {
        err.clone()
    };
    let mut value = match serde_json::to_value(&visible) {
        Ok(value) => value,
        Err(_) => json!({ "code": "internal_error", "message": "Internal server error" }),
    };
    if let Some(id) = TraceId::current() {
        value["traceId"] = json!(id.to_string());
    }
    value
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = TraceId::current() {
            builder.insert_header((TRACE_ID_HEADER, id.to_string()));
        }
        builder.json(payload(self))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("not yours"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("duplicate"), StatusCode::CONFLICT)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_statuses(#[case] err: Error, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[tokio::test]
    async fn internal_detail_never_reaches_the_client() {
        let response = Error::internal("connection string leaked").error_response();
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["message"], "Internal server error");
        assert!(!body.starts_with(b"connection string leaked"));
    }

    #[tokio::test]
    async fn client_errors_keep_their_message_and_details() {
        let response = Error::conflict("already registered")
            .with_details(json!({ "field": "email" }))
            .error_response();
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["code"], "conflict");
        assert_eq!(value["message"], "already registered");
        assert_eq!(value["details"]["field"], "email");
    }

    #[tokio::test]
    async fn payload_embeds_the_scoped_trace_id() {
        let trace_id: TraceId = "00000000-0000-0000-0000-000000000001"
            .parse()
            .expect("valid uuid");
        let value = TraceId::scope(trace_id, async { payload(&Error::not_found("missing")) }).await;
        assert_eq!(value["traceId"], trace_id.to_string());
    }
}
