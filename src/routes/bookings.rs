// src/routes/bookings.rs

use axum::{extract::{Path, Query, State}, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{query, query_as};

use crate::capacity::{self, Window};
use crate::models::{Booking, BookingStatus, ResourceStatus};
use crate::AppState;
use super::{bad_request, conflict, db_error, internal_error, not_found, ApiError};

#[derive(Deserialize)]
pub struct CreateBookingBody {
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default = "default_quantity")] pub quantity: i32,
    pub status: Option<String>, // pending (default) | confirmed
}
fn default_quantity() -> i32 { 1 }

#[derive(Deserialize)]
pub struct PatchBookingBody {
    pub status: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
}

#[derive(Deserialize)]
pub struct ListBookingsQ {
    pub resource_id: Option<i64>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct ListForResourceQ {
    pub status: Option<String>,
}

/// Capacity-counting windows for a resource that overlap [start, end).
/// Runs inside the caller's transaction so the FOR UPDATE lock on the
/// resource row keeps the check-then-insert sequence serialized.
async fn overlapping_windows(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    resource_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Window>, sqlx::Error> {
    let rows = query_as::<_, (DateTime<Utc>, DateTime<Utc>, i32)>(
        r#"
        SELECT start_at, end_at, quantity
        FROM public.bookings
        WHERE resource_id = $1
          AND status NOT IN ('cancelled','no_show')
          AND start_at < $3
          AND end_at > $2
        "#,
    )
    .bind(resource_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(start_at, end_at, quantity)| Window { start_at, end_at, quantity })
        .collect())
}

/// POST /api/v1/resources/:resource_id/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
    Json(b): Json<CreateBookingBody>,
) -> Result<Json<Booking>, ApiError> {
    if b.quantity < 1 {
        return Err(bad_request("quantity must be at least 1"));
    }
    if b.start_at >= b.end_at {
        return Err(bad_request("start_at must be before end_at"));
    }
    let initial = match b.status.as_deref() {
        None => BookingStatus::Pending,
        Some(s) => match BookingStatus::parse(s) {
            Some(st @ (BookingStatus::Pending | BookingStatus::Confirmed)) => st,
            Some(_) => return Err(bad_request(format!("cannot create a booking as '{s}'"))),
            None => return Err(bad_request(format!("unknown booking status '{s}'"))),
        },
    };

    let mut tx = state.pool.begin().await.map_err(internal_error)?;

    // Lock the resource row: serializes concurrent capacity checks
    // against this resource for the duration of the transaction.
    let resource = query_as::<_, (i32,)>(
        r#"SELECT capacity FROM public.resources WHERE resource_id = $1 FOR UPDATE"#,
    )
    .bind(resource_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(internal_error)?;

    let capacity = match resource {
        Some((c,)) => c,
        None => return Err(not_found(format!("resource {resource_id} not found"))),
    };

    let windows = overlapping_windows(&mut tx, resource_id, b.start_at, b.end_at)
        .await
        .map_err(internal_error)?;

    let remaining = capacity::remaining(capacity, &windows, b.start_at, b.end_at);
    if remaining < b.quantity as i64 {
        return Err(conflict(format!(
            "insufficient capacity: requested {}, remaining {}",
            b.quantity, remaining
        )));
    }

    let row = query_as::<_, Booking>(
        r#"
        INSERT INTO public.bookings
            (resource_id, guest_name, guest_email, start_at, end_at, quantity, status)
        VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING booking_id, resource_id, guest_name, guest_email,
                  start_at, end_at, quantity, status, created_at, updated_at
        "#,
    )
    .bind(resource_id)
    .bind(&b.guest_name)
    .bind(&b.guest_email)
    .bind(b.start_at)
    .bind(b.end_at)
    .bind(b.quantity)
    .bind(initial.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(internal_error)?;

    if initial == BookingStatus::Confirmed {
        mark_resource(&mut tx, resource_id, ResourceStatus::Booked)
            .await
            .map_err(internal_error)?;
    }

    tx.commit().await.map_err(internal_error)?;
    Ok(Json(row))
}

async fn mark_resource(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    resource_id: i64,
    status: ResourceStatus,
) -> Result<(), sqlx::Error> {
    query(r#"UPDATE public.resources SET status = $2 WHERE resource_id = $1"#)
        .bind(resource_id)
        .bind(status.as_str())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// GET /api/v1/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(q): Query<ListBookingsQ>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);

    let rows = match (q.resource_id, q.status) {
        (Some(rid), Some(st)) => {
            query_as::<_, Booking>(
                r#"SELECT * FROM public.bookings
                   WHERE resource_id = $1 AND status = $2
                   ORDER BY booking_id DESC
                   LIMIT $3 OFFSET $4"#)
                .bind(rid).bind(st).bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
        (Some(rid), None) => {
            query_as::<_, Booking>(
                r#"SELECT * FROM public.bookings
                   WHERE resource_id = $1
                   ORDER BY booking_id DESC
                   LIMIT $2 OFFSET $3"#)
                .bind(rid).bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
        (None, Some(st)) => {
            query_as::<_, Booking>(
                r#"SELECT * FROM public.bookings
                   WHERE status = $1
                   ORDER BY booking_id DESC
                   LIMIT $2 OFFSET $3"#)
                .bind(st).bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
        (None, None) => {
            query_as::<_, Booking>(
                r#"SELECT * FROM public.bookings
                   ORDER BY booking_id DESC
                   LIMIT $1 OFFSET $2"#)
                .bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
    };
    Ok(Json(rows))
}

/// GET /api/v1/resources/:resource_id/bookings
pub async fn list_bookings_for_resource(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
    Query(q): Query<ListForResourceQ>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let rows = if let Some(st) = q.status {
        query_as::<_, Booking>(
            r#"SELECT * FROM public.bookings
               WHERE resource_id = $1 AND status = $2
               ORDER BY start_at"#)
            .bind(resource_id).bind(st)
            .fetch_all(&state.pool).await.map_err(internal_error)?
    } else {
        query_as::<_, Booking>(
            r#"SELECT * FROM public.bookings
               WHERE resource_id = $1
               ORDER BY start_at"#)
            .bind(resource_id)
            .fetch_all(&state.pool).await.map_err(internal_error)?
    };
    Ok(Json(rows))
}

/// GET /api/v1/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, ApiError> {
    let row = query_as::<_, Booking>(
        r#"SELECT * FROM public.bookings WHERE booking_id = $1"#)
        .bind(id)
        .fetch_one(&state.pool).await.map_err(db_error)?;
    Ok(Json(row))
}

/// PATCH /api/v1/bookings/:id — guest detail edits and status transitions.
pub async fn patch_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchBookingBody>,
) -> Result<Json<Booking>, ApiError> {
    let mut tx = state.pool.begin().await.map_err(internal_error)?;

    let current = query_as::<_, Booking>(
        r#"SELECT * FROM public.bookings WHERE booking_id = $1 FOR UPDATE"#)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found(format!("booking {id} not found")))?;

    let next_status = match &b.status {
        None => None,
        Some(s) => {
            let from = BookingStatus::parse(&current.status)
                .ok_or_else(|| internal_error(format!("corrupt booking status '{}'", current.status)))?;
            let to = BookingStatus::parse(s)
                .ok_or_else(|| bad_request(format!("unknown booking status '{s}'")))?;
            if !from.can_transition_to(to) {
                return Err(bad_request(format!(
                    "illegal transition {} -> {}", from.as_str(), to.as_str()
                )));
            }
            Some((from, to))
        }
    };

    let row = query_as::<_, Booking>(
        r#"
        UPDATE public.bookings SET
            guest_name  = COALESCE($2, guest_name),
            guest_email = COALESCE($3, guest_email),
            status      = COALESCE($4, status),
            updated_at  = now()
        WHERE booking_id = $1
        RETURNING booking_id, resource_id, guest_name, guest_email,
                  start_at, end_at, quantity, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(b.guest_name)
    .bind(b.guest_email)
    .bind(next_status.map(|(_, to)| to.as_str()))
    .fetch_one(&mut *tx)
    .await
    .map_err(internal_error)?;

    // Side effect on the parent resource's two-state flag.
    if let Some((from, to)) = next_status {
        match (from, to) {
            (_, BookingStatus::Confirmed) => {
                mark_resource(&mut tx, current.resource_id, ResourceStatus::Booked)
                    .await
                    .map_err(internal_error)?;
            }
            (BookingStatus::Confirmed, BookingStatus::Cancelled) => {
                mark_resource(&mut tx, current.resource_id, ResourceStatus::Available)
                    .await
                    .map_err(internal_error)?;
            }
            _ => {}
        }
    }

    tx.commit().await.map_err(internal_error)?;
    Ok(Json(row))
}

/// DELETE /api/v1/bookings/:id
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let res = query(r#"DELETE FROM public.bookings WHERE booking_id = $1"#)
        .bind(id)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "deleted": res.rows_affected() > 0 })))
}
