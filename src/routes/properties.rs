// src/routes/properties.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as};

use crate::models::Property;
use crate::AppState;
use super::{db_error, internal_error, ApiError};

#[derive(Deserialize)]
pub struct ListQ {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreatePropertyBody {
    pub name: String,
    #[serde(default = "default_tz")] pub time_zone: String,
    #[serde(default = "default_status")] pub status: String,
}
fn default_tz() -> String { "UTC".into() }
fn default_status() -> String { "active".into() }

#[derive(Deserialize)]
pub struct PatchPropertyBody {
    pub name: Option<String>,
    pub time_zone: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct Deleted { pub deleted: bool }

pub async fn list_properties(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);
    let rows = if let Some(st) = q.status {
        query_as::<_, Property>(
            r#"SELECT * FROM public.properties WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"#
        )
        .bind(st)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool).await.map_err(internal_error)?
    } else {
        query_as::<_, Property>(
            r#"SELECT * FROM public.properties ORDER BY created_at DESC LIMIT $1 OFFSET $2"#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool).await.map_err(internal_error)?
    };
    Ok(Json(rows))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Property>, ApiError> {
    let row = query_as::<_, Property>(
        r#"SELECT * FROM public.properties WHERE property_id = $1"#
    )
    .bind(id)
    .fetch_one(&state.pool).await.map_err(db_error)?;
    Ok(Json(row))
}

pub async fn create_property(
    State(state): State<AppState>,
    Json(body): Json<CreatePropertyBody>,
) -> Result<Json<Property>, ApiError> {
    let row = query_as::<_, Property>(
        r#"
        INSERT INTO public.properties(name, time_zone, status)
        VALUES ($1,$2,$3)
        RETURNING property_id, name, time_zone, status, created_at, updated_at
        "#
    )
    .bind(&body.name)
    .bind(&body.time_zone)
    .bind(&body.status)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn patch_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PatchPropertyBody>,
) -> Result<Json<Property>, ApiError> {
    let row = query_as::<_, Property>(
        r#"
        UPDATE public.properties SET
            name      = COALESCE($2, name),
            time_zone = COALESCE($3, time_zone),
            status    = COALESCE($4, status),
            updated_at = now()
        WHERE property_id = $1
        RETURNING property_id, name, time_zone, status, created_at, updated_at
        "#
    )
    .bind(id)
    .bind(body.name)
    .bind(body.time_zone)
    .bind(body.status)
    .fetch_one(&state.pool).await.map_err(db_error)?;
    Ok(Json(row))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    let res = query(r#"DELETE FROM public.properties WHERE property_id = $1"#)
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(internal_error)?;
    Ok(Json(Deleted { deleted: res.rows_affected() > 0 }))
}
