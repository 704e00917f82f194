use axum::http::StatusCode;
use axum::Json;

pub mod health;
pub mod properties;
pub mod resources;
pub mod bookings;
pub mod availability;

pub type ApiError = (StatusCode, Json<serde_json::Value>);

fn envelope(message: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "error", "message": message.to_string() }))
}

// Common error mappers: every failure leaves the API as
// {"status":"error","message":"..."} with a conventional code.
pub fn internal_error<E: std::fmt::Display>(e: E) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, envelope(format!("internal error: {e}")))
}

pub fn bad_request(msg: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, envelope(msg))
}

pub fn not_found(msg: impl std::fmt::Display) -> ApiError {
    (StatusCode::NOT_FOUND, envelope(msg))
}

pub fn conflict(msg: impl std::fmt::Display) -> ApiError {
    (StatusCode::CONFLICT, envelope(msg))
}

/// sqlx mapper for lookups: RowNotFound becomes 404, everything else 500.
pub fn db_error(e: sqlx::Error) -> ApiError {
    match e {
        sqlx::Error::RowNotFound => not_found("not found"),
        other => internal_error(other),
    }
}
