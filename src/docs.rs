// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::pricing;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Budgets: cálculo stateless ---
        handlers::budgets::calculate,
        handlers::budgets::calculate_simplified,
        handlers::budgets::calculate_auto_markup,
        handlers::budgets::next_order_number,

        // --- Budgets: CRUD ---
        handlers::budgets::create_budget,
        handlers::budgets::list_budgets,
        handlers::budgets::get_budget,
        handlers::budgets::update_budget,
        handlers::budgets::delete_budget,

        // --- Budgets: operações ---
        handlers::budgets::recalculate,
        handlers::budgets::apply_markup,
        handlers::budgets::transition_status,
        handlers::documents::generate_budget_pdf,

        // --- Settings ---
        handlers::settings::get_markup_configuration,
        handlers::settings::update_markup_configuration,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Budgets ---
            models::budget::BudgetStatus,
            models::budget::MarketPosition,
            models::budget::Budget,
            models::budget::BudgetItem,
            models::budget::BudgetDetail,
            models::budget::BudgetItemDetail,
            models::budget::BudgetCalculation,
            models::budget::AutoMarkupCalculation,
            models::budget::AutoMarkupItemResult,
            models::budget::NextOrderNumberResponse,

            // --- Payloads ---
            models::budget::BudgetItemPayload,
            models::budget::CreateBudgetPayload,
            models::budget::UpdateBudgetPayload,
            models::budget::CalculateBudgetPayload,
            models::budget::AutoMarkupItemPayload,
            models::budget::AutoMarkupBudgetPayload,
            models::budget::UpdateStatusPayload,

            // --- Cálculo ---
            pricing::ItemFinancials,
            pricing::BudgetTotals,
            pricing::MarkupResolution,

            // --- Settings ---
            models::settings::MarkupConfiguration,
            models::settings::UpdateMarkupConfigurationRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Budgets", description = "Orçamentos: cálculo, CRUD e ciclo de vida"),
        (name = "Settings", description = "Configuração de Markup e Precificação")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
