// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod pricing;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Define as rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api_v1_routes = Router::new()
        // Cálculo stateless (preview dos formulários)
        .route("/budgets/calculate", post(handlers::budgets::calculate))
        .route(
            "/budgets/calculate-simplified",
            post(handlers::budgets::calculate_simplified),
        )
        .route(
            "/budgets/calculate-auto-markup",
            post(handlers::budgets::calculate_auto_markup),
        )
        .route(
            "/budgets/next-order-number",
            get(handlers::budgets::next_order_number),
        )
        // CRUD
        .route(
            "/budgets",
            post(handlers::budgets::create_budget).get(handlers::budgets::list_budgets),
        )
        .route(
            "/budgets/{id}",
            get(handlers::budgets::get_budget)
                .put(handlers::budgets::update_budget)
                .delete(handlers::budgets::delete_budget),
        )
        // Operações sobre orçamento persistido
        .route(
            "/budgets/{id}/recalculate",
            post(handlers::budgets::recalculate),
        )
        .route(
            "/budgets/{id}/apply-markup",
            post(handlers::budgets::apply_markup),
        )
        .route(
            "/budgets/{id}/status",
            post(handlers::budgets::transition_status),
        )
        .route(
            "/budgets/{id}/pdf",
            get(handlers::documents::generate_budget_pdf),
        )
        // Configuração de markup
        .route(
            "/settings/markup",
            get(handlers::settings::get_markup_configuration)
                .put(handlers::settings::update_markup_configuration),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/v1", api_v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
