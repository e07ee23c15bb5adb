//! Generic table endpoints: column names, projection, filtered selection

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::failed_read;
use crate::db::{ReadOutcome, TableRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{ConditionRequest, TableName};

/// Column names response
#[derive(Serialize)]
pub struct ColumnsResponse {
    pub success: bool,
    pub columns: Vec<String>,
}

/// Rows response; each row is an array in column order
#[derive(Serialize)]
pub struct RowsResponse {
    pub success: bool,
    pub rows: Vec<Value>,
}

impl RowsResponse {
    fn reply(status: StatusCode, success: bool, rows: Vec<Value>) -> Response {
        (status, Json(Self { success, rows })).into_response()
    }
}

/// Projection request
#[derive(Debug, Default, Deserialize)]
pub struct TableRowsRequest {
    #[serde(default)]
    pub cols: Option<Vec<String>>,
}

/// Selection request
#[derive(Debug, Default, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub conditions: Option<Vec<ConditionRequest>>,
}

/// GET /column-names/{tableName}
async fn column_names(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Response, ApiError> {
    let table = TableName::new(&table)?;

    let response = match TableRepo::new(&state.db).columns(&table).await {
        Ok(columns) => Json(ColumnsResponse {
            success: true,
            columns: columns.names(),
        })
        .into_response(),
        Err(e) => failed_read(
            e,
            "column-names",
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ColumnsResponse {
                    success: false,
                    columns: Vec::new(),
                }),
            )
                .into_response(),
        ),
    };
    Ok(response)
}

/// POST /table/{tableName}
async fn table_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(req): Json<TableRowsRequest>,
) -> Result<Response, ApiError> {
    let table = TableName::new(&table)?;
    let cols = req.cols.unwrap_or_default();

    let outcome: ReadOutcome<Value> = TableRepo::new(&state.db).rows(&table, &cols).await.into();

    let response = match outcome {
        ReadOutcome::Found(rows) => RowsResponse::reply(StatusCode::OK, true, rows),
        ReadOutcome::Empty => RowsResponse::reply(StatusCode::NOT_FOUND, false, Vec::new()),
        ReadOutcome::Failed(e) => failed_read(
            e,
            "table",
            RowsResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, false, Vec::new()),
        ),
    };
    Ok(response)
}

/// POST /table/selection/{tableName}
async fn selected_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(req): Json<SelectionRequest>,
) -> Result<Response, ApiError> {
    let table = TableName::new(&table)?;
    let conditions = req.conditions.unwrap_or_default();

    let outcome: ReadOutcome<Value> = TableRepo::new(&state.db)
        .select(&table, conditions)
        .await
        .into();

    let response = match outcome {
        ReadOutcome::Found(rows) => RowsResponse::reply(StatusCode::OK, true, rows),
        ReadOutcome::Empty => RowsResponse::reply(StatusCode::OK, true, Vec::new()),
        ReadOutcome::Failed(e) => failed_read(
            e,
            "table/selection",
            RowsResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, false, Vec::new()),
        ),
    };
    Ok(response)
}

/// Table routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/column-names/{table}", get(column_names))
        .route("/table/{table}", post(table_rows))
        .route("/table/selection/{table}", post(selected_rows))
}
