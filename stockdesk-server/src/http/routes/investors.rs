//! Investor endpoints: register, list, update, delete

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::common::{failed_read, DataResponse, MessageResponse};
use crate::db::{InvestorRepo, ReadOutcome};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{
    validation, Investor, InvestorListing, InvestorUpdate, NewInvestor, RegisterInvestorRequest,
    UpdateInvestorRequest,
};

/// Registration response
#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
}

/// Delete investor request
#[derive(Deserialize)]
pub struct DeleteInvestorRequest {
    pub id: Option<String>,
}

/// POST /register-user
async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterInvestorRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let investor = NewInvestor::try_from(req)?;
    InvestorRepo::new(&state.db).register(&investor).await?;

    Ok(Json(RegisterResponse {
        message: "User registered successfully!",
    }))
}

/// GET /investors
async fn list_investors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Investor>>, ApiError> {
    let investors = InvestorRepo::new(&state.db).list().await?;
    Ok(Json(investors))
}

/// POST /update-investor-details
async fn update_investor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateInvestorRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let update = InvestorUpdate::try_from(req)?;
    InvestorRepo::new(&state.db).update(&update).await?;

    Ok(MessageResponse::ok("Investor details updated!"))
}

/// POST /delete-investor
async fn delete_investor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteInvestorRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = validation::required(req.id, "id")?;
    InvestorRepo::new(&state.db).delete(&id).await?;

    Ok(MessageResponse::ok("Investor deleted successfully!"))
}

/// GET /show-AllInvestor
async fn show_all_investors(State(state): State<Arc<AppState>>) -> Response {
    let outcome: ReadOutcome<InvestorListing> =
        InvestorRepo::new(&state.db).listing().await.into();

    match outcome {
        ReadOutcome::Found(rows) => DataResponse::found(rows, "All Investors are shown!"),
        ReadOutcome::Empty => {
            DataResponse::found(Vec::<InvestorListing>::new(), "All Investors are shown!")
        }
        ReadOutcome::Failed(e) => failed_read(
            e,
            "show-AllInvestor",
            DataResponse::<Vec<InvestorListing>>::missing(
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                "Failed to show all investors.",
            ),
        ),
    }
}

/// Investor routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register-user", post(register_user))
        .route("/investors", get(list_investors))
        .route("/update-investor-details", post(update_investor))
        .route("/delete-investor", post(delete_investor))
        .route("/show-AllInvestor", get(show_all_investors))
}
