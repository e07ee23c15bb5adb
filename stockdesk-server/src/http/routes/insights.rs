//! Insight endpoints: fixed analytical queries returned as result sets

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::common::{failed_read, DataResponse};
use crate::db::{DbError, InsightRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{InsightKind, ResultSet};

#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn result_set_response(result: Result<ResultSet, DbError>, endpoint: &'static str) -> Response {
    match result {
        Ok(set) if set.is_empty() => {
            DataResponse::missing(StatusCode::OK, Some(set), "No data to show.")
        }
        Ok(set) => DataResponse::found(set, "Fetching insights successful!"),
        Err(e) => failed_read(
            e,
            endpoint,
            DataResponse::<ResultSet>::missing(
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                "Failed to fetch insights.",
            ),
        ),
    }
}

/// GET /insights?type=
async fn insights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InsightQuery>,
) -> Result<Response, ApiError> {
    let kind = InsightKind::parse(query.kind.as_deref().unwrap_or_default())?;
    let result = InsightRepo::new(&state.db).insight(kind).await;
    Ok(result_set_response(result, "insights"))
}

/// GET /all-company-stock-owners
async fn all_company_stock_owners(State(state): State<Arc<AppState>>) -> Response {
    let result = InsightRepo::new(&state.db).all_company_owners().await;
    result_set_response(result, "all-company-stock-owners")
}

/// Insight routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/insights", get(insights))
        .route("/all-company-stock-owners", get(all_company_stock_owners))
}
