// src/routes/resources.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::{query, query_as};

use crate::models::{Resource, ResourceStatus};
use crate::AppState;
use super::{bad_request, db_error, internal_error, ApiError};

#[derive(Deserialize)]
pub struct ListResourcesQ {
    pub kind: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateResourceBody {
    pub kind: String, // room | hall | spa | table
    pub name: String,
    pub capacity: i32,
    pub price_cents: i64,
    #[serde(default)] pub amenities: serde_json::Value,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct PatchResourceBody {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub price_cents: Option<i64>,
    pub amenities: Option<serde_json::Value>,
    pub description: Option<String>,
    pub status: Option<String>,
}

const KINDS: [&str; 4] = ["room", "hall", "spa", "table"];

pub async fn create_resource(
    State(state): State<AppState>,
    Path(property_id): Path<i64>,
    Json(body): Json<CreateResourceBody>,
) -> Result<Json<Resource>, ApiError> {
    if !KINDS.contains(&body.kind.as_str()) {
        return Err(bad_request(format!("unknown resource kind '{}'", body.kind)));
    }
    if body.capacity < 1 {
        return Err(bad_request("capacity must be at least 1"));
    }

    let row = query_as::<_, Resource>(
        r#"
        INSERT INTO public.resources
            (property_id, kind, name, capacity, price_cents, amenities, description, status)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING resource_id, property_id, kind, name, capacity, price_cents,
                  amenities, description, status
        "#
    )
    .bind(property_id)
    .bind(&body.kind)
    .bind(&body.name)
    .bind(body.capacity)
    .bind(body.price_cents)
    .bind(&body.amenities)
    .bind(&body.description)
    .bind(ResourceStatus::Available.as_str())
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_resources_for_property(
    State(state): State<AppState>,
    Path(property_id): Path<i64>,
    Query(q): Query<ListResourcesQ>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);

    let rows = if let Some(kind) = q.kind {
        query_as::<_, Resource>(
            r#"SELECT * FROM public.resources
               WHERE property_id = $1 AND kind = $2
               ORDER BY resource_id DESC
               LIMIT $3 OFFSET $4"#)
            .bind(property_id).bind(kind).bind(limit).bind(offset)
            .fetch_all(&state.pool).await.map_err(internal_error)?
    } else {
        query_as::<_, Resource>(
            r#"SELECT * FROM public.resources
               WHERE property_id = $1
               ORDER BY resource_id DESC
               LIMIT $2 OFFSET $3"#)
            .bind(property_id).bind(limit).bind(offset)
            .fetch_all(&state.pool).await.map_err(internal_error)?
    };
    Ok(Json(rows))
}

pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Resource>, ApiError> {
    let row = query_as::<_, Resource>(
        r#"SELECT * FROM public.resources WHERE resource_id = $1"#
    )
    .bind(id)
    .fetch_one(&state.pool).await.map_err(db_error)?;
    Ok(Json(row))
}

pub async fn patch_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PatchResourceBody>,
) -> Result<Json<Resource>, ApiError> {
    if let Some(c) = body.capacity {
        if c < 1 {
            return Err(bad_request("capacity must be at least 1"));
        }
    }
    if let Some(st) = &body.status {
        if st != "available" && st != "booked" {
            return Err(bad_request(format!("unknown resource status '{st}'")));
        }
    }

    let row = query_as::<_, Resource>(
        r#"
        UPDATE public.resources SET
            name        = COALESCE($2, name),
            capacity    = COALESCE($3, capacity),
            price_cents = COALESCE($4, price_cents),
            amenities   = COALESCE($5, amenities),
            description = COALESCE($6, description),
            status      = COALESCE($7, status)
        WHERE resource_id = $1
        RETURNING resource_id, property_id, kind, name, capacity, price_cents,
                  amenities, description, status
        "#
    )
    .bind(id)
    .bind(body.name)
    .bind(body.capacity)
    .bind(body.price_cents)
    .bind(body.amenities)
    .bind(body.description)
    .bind(body.status)
    .fetch_one(&state.pool).await.map_err(db_error)?;
    Ok(Json(row))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let res = query(r#"DELETE FROM public.resources WHERE resource_id = $1"#)
        .bind(id)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "deleted": res.rows_affected() > 0 })))
}
