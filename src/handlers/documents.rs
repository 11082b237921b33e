// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

// GET /api/v1/budgets/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{id}/pdf",
    tag = "Budgets",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Proposta em PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_budget_pdf(
    State(app_state): State<AppState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .document_service
        .generate_budget_pdf(&app_state.db_pool, budget_id)
        .await?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"orcamento_{}.pdf\"", budget_id),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
