//! Company profile printed in report headers.

use api_types::company::{CompanyProfileUpsert, CompanyProfileView};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use engine::{CompanyProfile, EngineError};

use crate::{ServerError, required, server::ServerState};

fn map_profile(profile: CompanyProfile) -> CompanyProfileView {
    CompanyProfileView {
        name: profile.name,
        phone: profile.phone,
        email: profile.email,
        address: profile.address,
    }
}

fn profile_from_wire(payload: CompanyProfileUpsert) -> Result<CompanyProfile, ServerError> {
    Ok(CompanyProfile {
        name: required(payload.name, "name")?,
        phone: payload.phone,
        email: payload.email,
        address: payload.address,
    })
}

pub async fn get(State(state): State<ServerState>) -> Result<Json<CompanyProfileView>, ServerError> {
    let profile = state
        .engine
        .company_profile()
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("company profile".to_string()))?;
    Ok(Json(map_profile(profile)))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<CompanyProfileUpsert>, ServerError>,
) -> Result<(StatusCode, Json<CompanyProfileView>), ServerError> {
    let profile = profile_from_wire(payload)?;
    let profile = state.engine.create_company_profile(profile).await?;
    Ok((StatusCode::CREATED, Json(map_profile(profile))))
}

pub async fn upsert(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<CompanyProfileUpsert>, ServerError>,
) -> Result<Json<CompanyProfileView>, ServerError> {
    let profile = profile_from_wire(payload)?;
    let profile = state.engine.upsert_company_profile(profile).await?;
    Ok(Json(map_profile(profile)))
}
