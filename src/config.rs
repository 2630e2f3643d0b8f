// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        BonificationRepository, CashAdvanceRepository, ChargeRepository, ExpenseRepository,
        InventoryRepository, PersonRepository, ProgramRepository, ReportRepository,
        TransactionRepository,
    },
    services::{
        advance_service::CashAdvanceService, auth::AuthService,
        bonification_service::BonificationService, charge_service::ChargeService,
        earnings_service::EarningsService, expense_service::ExpenseService,
        report_service::ReportService, transaction_service::TransactionService,
    },
    settlement::commission::{CommissionDefaults, DEFAULT_COLPORTER_PERCENTAGE, DEFAULT_LEADER_PERCENTAGE},
};

const DEFAULT_CASH_ADVANCE_PERCENTAGE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Lê uma variável opcional; ausente usa o padrão, presente precisa ser válida.
pub fn parse_setting<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválida ('{}'): {}", name, value, e)),
    }
}

fn setting<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_setting(name, env::var(name).ok(), default)
}

/// Parâmetros do motor que não vêm do banco.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub commission: CommissionDefaults,
    pub cash_advance_percentage: Decimal,
}

impl EngineSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = Self {
            bind_addr: setting("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            db_max_connections: setting("DB_MAX_CONNECTIONS", 5)?,
            commission: CommissionDefaults {
                colporter: setting("DEFAULT_COLPORTER_PERCENTAGE", DEFAULT_COLPORTER_PERCENTAGE)?,
                leader: setting("DEFAULT_LEADER_PERCENTAGE", DEFAULT_LEADER_PERCENTAGE)?,
            },
            cash_advance_percentage: setting(
                "DEFAULT_CASH_ADVANCE_PERCENTAGE",
                DEFAULT_CASH_ADVANCE_PERCENTAGE,
            )?,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("DEFAULT_COLPORTER_PERCENTAGE", self.commission.colporter),
            ("DEFAULT_LEADER_PERCENTAGE", self.commission.leader),
            ("DEFAULT_CASH_ADVANCE_PERCENTAGE", self.cash_advance_percentage),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                anyhow::bail!("{} deve estar entre 0 e 100 (recebido {})", name, value);
            }
        }
        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS deve ser maior que zero");
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: EngineSettings,
    pub auth_service: AuthService,
    pub transaction_service: TransactionService,
    pub earnings_service: EarningsService,
    pub expense_service: ExpenseService,
    pub charge_service: ChargeService,
    pub advance_service: CashAdvanceService,
    pub bonification_service: BonificationService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let settings = EngineSettings::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, &jwt_secret, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, jwt_secret: &str, settings: EngineSettings) -> Self {
        let person_repo = PersonRepository::new(db_pool.clone());
        let program_repo = ProgramRepository::new(db_pool.clone());
        let transaction_repo = TransactionRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new();
        let expense_repo = ExpenseRepository::new(db_pool.clone());
        let charge_repo = ChargeRepository::new(db_pool.clone());
        let advance_repo = CashAdvanceRepository::new(db_pool.clone());
        let bonification_repo = BonificationRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        let transaction_service = TransactionService::new(
            db_pool.clone(),
            transaction_repo.clone(),
            person_repo.clone(),
            inventory_repo,
        );
        let earnings_service = EarningsService::new(
            db_pool.clone(),
            person_repo.clone(),
            program_repo.clone(),
            transaction_repo.clone(),
            charge_repo.clone(),
            advance_repo.clone(),
            expense_repo.clone(),
            settings.commission,
        );
        let expense_service = ExpenseService::new(
            db_pool.clone(),
            expense_repo,
            program_repo.clone(),
            person_repo.clone(),
        );
        let charge_service = ChargeService::new(db_pool.clone(), charge_repo, person_repo.clone());
        let advance_service = CashAdvanceService::new(
            db_pool.clone(),
            advance_repo,
            person_repo.clone(),
            program_repo.clone(),
            transaction_repo,
            settings.cash_advance_percentage,
        );
        let bonification_service = BonificationService::new(
            db_pool.clone(),
            bonification_repo,
            person_repo,
            program_repo,
            settings.commission,
        );
        let report_service = ReportService::new(report_repo);

        Self {
            db_pool,
            auth_service: AuthService::new(jwt_secret),
            settings,
            transaction_service,
            earnings_service,
            expense_service,
            charge_service,
            advance_service,
            bonification_service,
            report_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_settings_use_defaults() {
        assert_eq!(parse_setting("DB_MAX_CONNECTIONS", None, 5u32).unwrap(), 5);
        assert_eq!(
            parse_setting("DEFAULT_LEADER_PERCENTAGE", None, DEFAULT_LEADER_PERCENTAGE).unwrap(),
            Decimal::new(15, 0)
        );
    }

    #[test]
    fn present_settings_must_parse() {
        assert_eq!(
            parse_setting("DEFAULT_COLPORTER_PERCENTAGE", Some(" 45.5 ".into()), Decimal::ZERO).unwrap(),
            Decimal::new(455, 1)
        );
        let err = parse_setting("DB_MAX_CONNECTIONS", Some("muitas".into()), 5u32).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn percentages_outside_range_are_rejected() {
        let settings = EngineSettings {
            bind_addr: "0.0.0.0:3000".into(),
            db_max_connections: 5,
            commission: CommissionDefaults {
                colporter: Decimal::new(150, 0),
                leader: DEFAULT_LEADER_PERCENTAGE,
            },
            cash_advance_percentage: DEFAULT_CASH_ADVANCE_PERCENTAGE,
        };
        assert!(settings.validate().is_err());

        let ok = EngineSettings { commission: CommissionDefaults::default(), ..settings };
        assert!(ok.validate().is_ok());
    }
}
