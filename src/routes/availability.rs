// src/routes/availability.rs

use axum::{extract::{Path, Query, State}, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as};

use crate::capacity::{self, Window};
use crate::models::AvailabilityDay;
use crate::AppState;
use super::{bad_request, internal_error, not_found, ApiError};

#[derive(Deserialize)]
pub struct RangeQ {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Deserialize)]
pub struct RebuildBody {
    pub from: NaiveDate,
    pub to: NaiveDate, // inclusive
}

#[derive(Deserialize)]
pub struct CheckQ {
    pub from: chrono::DateTime<chrono::Utc>,
    pub to: chrono::DateTime<chrono::Utc>,
    #[serde(default = "default_quantity")] pub quantity: i32,
}
fn default_quantity() -> i32 { 1 }

#[derive(Serialize)]
pub struct CheckResp {
    pub available: bool,
    pub capacity: i32,
    pub booked: i64,
    pub remaining: i64,
}

async fn resource_capacity(
    pool: &sqlx::PgPool,
    resource_id: i64,
) -> Result<i32, ApiError> {
    query_as::<_, (i32,)>(
        r#"SELECT capacity FROM public.resources WHERE resource_id = $1"#,
    )
    .bind(resource_id)
    .fetch_optional(pool)
    .await
    .map_err(internal_error)?
    .map(|(c,)| c)
    .ok_or_else(|| not_found(format!("resource {resource_id} not found")))
}

/// GET /api/v1/resources/:id/availability — materialized rows for a range.
pub async fn list_availability(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
    Query(q): Query<RangeQ>,
) -> Result<Json<Vec<AvailabilityDay>>, ApiError> {
    let rows = query_as::<_, AvailabilityDay>(
        r#"SELECT * FROM public.availability_days
           WHERE resource_id = $1 AND day BETWEEN $2 AND $3
           ORDER BY day"#)
        .bind(resource_id).bind(q.from).bind(q.to)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

/// POST /api/v1/resources/:id/availability/rebuild
///
/// Batch recomputation of the per-day snapshot: loads the capacity-counting
/// bookings overlapping the range once, tallies per calendar day, and upserts
/// one row per day in a single transaction.
pub async fn rebuild_availability(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
    Json(b): Json<RebuildBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if b.from > b.to {
        return Err(bad_request("from must not be after to"));
    }
    let capacity = resource_capacity(&state.pool, resource_id).await?;

    let range_start = capacity::day_start(b.from);
    let range_end = capacity::day_start(b.to.succ_opt().ok_or_else(|| bad_request("date out of range"))?);

    let rows = query_as::<_, (chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>, i32)>(
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
    .bind(range_start)
    .bind(range_end)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;

    let windows: Vec<Window> = rows
        .into_iter()
        .map(|(start_at, end_at, quantity)| Window { start_at, end_at, quantity })
        .collect();

    let tally = capacity::day_tally(&windows, b.from, b.to);

    let mut tx = state.pool.begin().await.map_err(internal_error)?;
    for (day, booked) in &tally {
        let booked = (*booked).min(i32::MAX as i64) as i32;
        let available = (capacity - booked).max(0);
        query(
            r#"
            INSERT INTO public.availability_days(resource_id, day, total, booked, available)
            VALUES ($1,$2,$3,$4,$5)
            ON CONFLICT (resource_id, day)
            DO UPDATE SET total = EXCLUDED.total,
                          booked = EXCLUDED.booked,
                          available = EXCLUDED.available
            "#,
        )
        .bind(resource_id)
        .bind(*day)
        .bind(capacity)
        .bind(booked)
        .bind(available)
        .execute(&mut *tx).await.map_err(internal_error)?;
    }
    tx.commit().await.map_err(internal_error)?;

    Ok(Json(serde_json::json!({ "upserted": tally.len() })))
}

/// GET /api/v1/resources/:id/availability/check — live overlap check
/// against the bookings table, bypassing the materialized view.
pub async fn check_availability(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
    Query(q): Query<CheckQ>,
) -> Result<Json<CheckResp>, ApiError> {
    if q.quantity < 1 {
        return Err(bad_request("quantity must be at least 1"));
    }
    if q.from >= q.to {
        return Err(bad_request("from must be before to"));
    }
    let capacity = resource_capacity(&state.pool, resource_id).await?;

    let rows = query_as::<_, (chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>, i32)>(
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
    .bind(q.from)
    .bind(q.to)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;

    let windows: Vec<Window> = rows
        .into_iter()
        .map(|(start_at, end_at, quantity)| Window { start_at, end_at, quantity })
        .collect();

    let booked = capacity::booked_during(&windows, q.from, q.to);
    let remaining = capacity::remaining(capacity, &windows, q.from, q.to);

    Ok(Json(CheckResp {
        available: remaining >= q.quantity as i64,
        capacity,
        booked,
        remaining,
    }))
}
