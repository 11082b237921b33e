// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::settings::{MarkupConfiguration, UpdateMarkupConfigurationRequest},
};

// GET /api/v1/settings/markup
#[utoipa::path(
    get,
    path = "/api/v1/settings/markup",
    tag = "Settings",
    responses(
        (status = 200, description = "Configuração de markup vigente", body = MarkupConfiguration)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_markup_configuration(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state
        .settings_repo
        .get_configuration(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(config)))
}

// PUT /api/v1/settings/markup
#[utoipa::path(
    put,
    path = "/api/v1/settings/markup",
    tag = "Settings",
    request_body = UpdateMarkupConfigurationRequest,
    responses(
        (status = 200, description = "Configuração atualizada", body = MarkupConfiguration)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_markup_configuration(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateMarkupConfigurationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state
        .settings_repo
        .update_configuration(&app_state.db_pool, payload)
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}
