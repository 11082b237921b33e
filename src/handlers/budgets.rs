// src/handlers/budgets.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::budget::{
        ApplyMarkupParams, AutoMarkupBudgetPayload, AutoMarkupCalculation, Budget,
        BudgetCalculation, BudgetDetail, CalculateBudgetPayload, CreateBudgetPayload,
        NextOrderNumberResponse, UpdateBudgetPayload, UpdateStatusPayload,
    },
};

// =============================================================================
//  ÁREA 1: CÁLCULO STATELESS (preview)
// =============================================================================

// POST /api/v1/budgets/calculate
#[utoipa::path(
    post,
    path = "/api/v1/budgets/calculate",
    tag = "Budgets",
    request_body = CalculateBudgetPayload,
    responses(
        (status = 200, description = "Cálculo completo do orçamento", body = BudgetCalculation),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn calculate(
    State(app_state): State<AppState>,
    Json(payload): Json<CalculateBudgetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let calculation = app_state
        .budget_service
        .calculate_preview(&app_state.db_pool, payload)
        .await?;

    Ok((StatusCode::OK, Json(calculation)))
}

// POST /api/v1/budgets/calculate-simplified
//
// Mesma matemática do /calculate; rota separada para o formulário
// simplificado, que envia o mesmo shape de item.
#[utoipa::path(
    post,
    path = "/api/v1/budgets/calculate-simplified",
    tag = "Budgets",
    request_body = CalculateBudgetPayload,
    responses(
        (status = 200, description = "Preview do orçamento simplificado", body = BudgetCalculation),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn calculate_simplified(
    State(app_state): State<AppState>,
    Json(payload): Json<CalculateBudgetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let calculation = app_state
        .budget_service
        .calculate_preview(&app_state.db_pool, payload)
        .await?;

    Ok((StatusCode::OK, Json(calculation)))
}

// POST /api/v1/budgets/calculate-auto-markup
#[utoipa::path(
    post,
    path = "/api/v1/budgets/calculate-auto-markup",
    tag = "Budgets",
    request_body = AutoMarkupBudgetPayload,
    responses(
        (status = 200, description = "Markup resolvido e preços derivados", body = AutoMarkupCalculation),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Margem mínima impossível de satisfazer")
    ),
    security(("api_jwt" = []))
)]
pub async fn calculate_auto_markup(
    State(app_state): State<AppState>,
    Json(payload): Json<AutoMarkupBudgetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let calculation = app_state
        .budget_service
        .calculate_auto_markup(&app_state.db_pool, payload)
        .await?;

    Ok((StatusCode::OK, Json(calculation)))
}

// GET /api/v1/budgets/next-order-number
#[utoipa::path(
    get,
    path = "/api/v1/budgets/next-order-number",
    tag = "Budgets",
    responses(
        (status = 200, description = "Próximo número de orçamento", body = NextOrderNumberResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn next_order_number(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let order_number = app_state
        .budget_service
        .next_order_number(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(NextOrderNumberResponse { order_number })))
}

// =============================================================================
//  ÁREA 2: CRUD
// =============================================================================

// POST /api/v1/budgets
#[utoipa::path(
    post,
    path = "/api/v1/budgets",
    tag = "Budgets",
    request_body = CreateBudgetPayload,
    responses(
        (status = 201, description = "Orçamento criado", body = BudgetDetail),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_budget(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateBudgetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let budget = app_state
        .budget_service
        .create_budget(&app_state.db_pool, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(budget)))
}

// GET /api/v1/budgets
#[utoipa::path(
    get,
    path = "/api/v1/budgets",
    tag = "Budgets",
    responses(
        (status = 200, description = "Lista de orçamentos", body = Vec<Budget>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_budgets(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let budgets = app_state
        .budget_service
        .list_budgets(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(budgets)))
}

// GET /api/v1/budgets/{id}
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{id}",
    tag = "Budgets",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento com itens e detalhamento", body = BudgetDetail),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_budget(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let budget = app_state
        .budget_service
        .get_budget(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(budget)))
}

// PUT /api/v1/budgets/{id}
#[utoipa::path(
    put,
    path = "/api/v1/budgets/{id}",
    tag = "Budgets",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    request_body = UpdateBudgetPayload,
    responses(
        (status = 200, description = "Orçamento atualizado e recalculado", body = BudgetDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_budget(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBudgetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let budget = app_state
        .budget_service
        .update_budget(&app_state.db_pool, id, payload)
        .await?;

    Ok((StatusCode::OK, Json(budget)))
}

// DELETE /api/v1/budgets/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/budgets/{id}",
    tag = "Budgets",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 204, description = "Orçamento excluído"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_budget(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .budget_service
        .delete_budget(&app_state.db_pool, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: OPERAÇÕES SOBRE ORÇAMENTO PERSISTIDO
// =============================================================================

// POST /api/v1/budgets/{id}/recalculate
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{id}/recalculate",
    tag = "Budgets",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Derivados recalculados", body = BudgetDetail),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn recalculate(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let budget = app_state
        .budget_service
        .recalculate(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(budget)))
}

// POST /api/v1/budgets/{id}/apply-markup?markup_percentage=
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{id}/apply-markup",
    tag = "Budgets",
    params(
        ("id" = Uuid, Path, description = "ID do orçamento"),
        ApplyMarkupParams
    ),
    responses(
        (status = 200, description = "Markup aplicado aos itens", body = BudgetDetail),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_markup(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ApplyMarkupParams>,
) -> Result<impl IntoResponse, AppError> {
    let budget = app_state
        .budget_service
        .apply_markup(&app_state.db_pool, id, params.markup_percentage)
        .await?;

    Ok((StatusCode::OK, Json(budget)))
}

// POST /api/v1/budgets/{id}/status
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{id}/status",
    tag = "Budgets",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Budget),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 422, description = "Transição de status inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let budget = app_state
        .budget_service
        .transition_status(&app_state.db_pool, id, payload.status)
        .await?;

    Ok((StatusCode::OK, Json(budget)))
}
