//! Liveness probe.

use actix_web::{HttpResponse, get};
use serde_json::json;

/// Report that the process is up and serving requests.
#[get("/healthz")]
pub async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
