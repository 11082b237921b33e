// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{MarkupConfiguration, UpdateMarkupConfigurationRequest},
};

// Repositório sem estado: cada método recebe o executor de quem chama.
#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_configuration<'e, E>(
        &self,
        executor: E,
    ) -> Result<MarkupConfiguration, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // A migração semeia a linha única; se alguém a removeu, caímos nos
        // defaults em vez de quebrar o cálculo.
        let config = sqlx::query_as::<_, MarkupConfiguration>(
            "SELECT * FROM markup_configuration WHERE id = 1",
        )
        .fetch_optional(executor)
        .await?;

        Ok(config.unwrap_or_default())
    }

    pub async fn update_configuration<'e, E>(
        &self,
        executor: E,
        input: UpdateMarkupConfigurationRequest,
    ) -> Result<MarkupConfiguration, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT parcial: campos ausentes preservam o valor atual.
        let config = sqlx::query_as::<_, MarkupConfiguration>(
            r#"
            INSERT INTO markup_configuration (
                id, minimum_markup_percentage, maximum_markup_percentage,
                default_market_position, icms_sale_default,
                commission_default, other_expenses_default
            )
            VALUES (
                1,
                COALESCE($1, 10),
                COALESCE($2, 300),
                COALESCE($3, 'COMPETITIVE'),
                COALESCE($4, 0.18),
                COALESCE($5, 0.015),
                COALESCE($6, 0)
            )
            ON CONFLICT (id)
            DO UPDATE SET
                minimum_markup_percentage = COALESCE($1, markup_configuration.minimum_markup_percentage),
                maximum_markup_percentage = COALESCE($2, markup_configuration.maximum_markup_percentage),
                default_market_position = COALESCE($3, markup_configuration.default_market_position),
                icms_sale_default = COALESCE($4, markup_configuration.icms_sale_default),
                commission_default = COALESCE($5, markup_configuration.commission_default),
                other_expenses_default = COALESCE($6, markup_configuration.other_expenses_default),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(input.minimum_markup_percentage)
        .bind(input.maximum_markup_percentage)
        .bind(input.default_market_position)
        .bind(input.icms_sale_default)
        .bind(input.commission_default)
        .bind(input.other_expenses_default)
        .fetch_one(executor)
        .await?;

        Ok(config)
    }
}
