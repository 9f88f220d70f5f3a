//! Startup wiring and the system HTTP API for the Elemo server.

pub mod config;
pub mod startup;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::Utc;
use elemo_license::{License, LicenseSlot, LicenseStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LicenseResponse {
    pub id: String,
    pub email: String,
    pub organization: String,
    pub features: Vec<String>,
    pub quotas: BTreeMap<String, u32>,
    pub expires_at: String,
    pub valid: bool,
    pub status: LicenseStatus,
    pub days_remaining: i64,
}

impl LicenseResponse {
    fn from_license(license: &License) -> Self {
        let now = Utc::now();
        Self {
            id: license.id().to_string(),
            email: license.email().to_string(),
            organization: license.organization().to_string(),
            features: license.features().iter().map(|f| f.as_str().to_string()).collect(),
            quotas: license.quotas().clone(),
            expires_at: license.expires_at_text(),
            valid: license.is_valid(now),
            status: license.status(now),
            days_remaining: license.days_remaining(now),
        }
    }
}

async fn health_handler(
    State(slot): State<Arc<LicenseSlot>>,
) -> (StatusCode, Json<HealthResponse>) {
    match slot.current().status(Utc::now()) {
        LicenseStatus::Valid => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
            }),
        ),
        LicenseStatus::Expired => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unlicensed".to_string(),
            }),
        ),
    }
}

async fn license_handler(State(slot): State<Arc<LicenseSlot>>) -> Json<LicenseResponse> {
    Json(LicenseResponse::from_license(&slot.current()))
}

/// Build the system API router over the given license slot.
pub fn build_router(slot: Arc<LicenseSlot>) -> Router {
    Router::new()
        .route("/api/v1/system/health", get(health_handler))
        .route("/api/v1/system/license", get(license_handler))
        .with_state(slot)
}
