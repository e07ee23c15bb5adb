//! Join and aggregate endpoints over executed transactions

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::common::DataResponse;
use crate::db::HoldingRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{validation, CompanyThreshold};

#[derive(Debug, Deserialize)]
pub struct BuyersQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SharesQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub number: Option<String>,
}

/// Non-empty rows answer 200, empty ones 404 with `empty_message`.
fn rows_or_404<T: Serialize>(rows: Vec<T>, empty_message: &'static str) -> Response {
    if rows.is_empty() {
        DataResponse::<Vec<T>>::missing(StatusCode::NOT_FOUND, None, empty_message)
    } else {
        DataResponse::found(rows, "FOUND!")
    }
}

/// GET /find-Buyers?name=
async fn find_buyers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BuyersQuery>,
) -> Result<Response, ApiError> {
    let company = validation::required(query.name, "name")?;
    let rows = HoldingRepo::new(&state.db).buyers_of(&company).await?;
    Ok(rows_or_404(rows, "No buyers found."))
}

/// GET /list-Shares?id=
async fn list_shares(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SharesQuery>,
) -> Result<Response, ApiError> {
    let id = validation::required(query.id, "id")?;
    let rows = HoldingRepo::new(&state.db).shares_of(&id).await?;
    Ok(rows_or_404(rows, "No shares found."))
}

/// GET /list-Stock?number=
async fn list_stock(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StockQuery>,
) -> Result<Response, ApiError> {
    let threshold = CompanyThreshold::parse(query.number.as_deref())?;
    let rows = HoldingRepo::new(&state.db).diversified(threshold).await?;
    Ok(rows_or_404(rows, "No investor ID found."))
}

/// Holdings routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/find-Buyers", get(find_buyers))
        .route("/list-Shares", get(list_shares))
        .route("/list-Stock", get(list_stock))
}
