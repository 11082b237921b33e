// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{BudgetRepository, SettingsRepository, UserRepository},
    services::{
        auth::AuthService, budget_service::BudgetService, document_service::DocumentService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub budget_service: BudgetService,
    pub document_service: DocumentService,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let budget_repo = BudgetRepository::new();
        let settings_repo = SettingsRepository::new();

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let budget_service = BudgetService::new(budget_repo.clone(), settings_repo.clone());
        let document_service = DocumentService::new(budget_repo, settings_repo.clone());

        Ok(Self {
            db_pool,
            auth_service,
            budget_service,
            document_service,
            settings_repo,
        })
    }
}
