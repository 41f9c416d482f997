// src/config.rs

use anyhow::{Context, bail};
use sqlx::{MySqlPool, mysql::MySqlPoolOptions};
use std::{env, str::FromStr, time::Duration};

use crate::{common::i18n::I18nStore, db::ReportRepository, services::ReportService};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub business_utc_offset_hours: i32,
    pub cors_origins: Vec<String>,
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {value}")),
        _ => Ok(default),
    }
}

fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let business_utc_offset_hours = env_or("BUSINESS_UTC_OFFSET_HOURS", 9)?;
        if !(-12..=14).contains(&business_utc_offset_hours) {
            bail!("BUSINESS_UTC_OFFSET_HOURS must be between -12 and 14");
        }

        Ok(Self {
            database_url,
            host: env_or("HOST", "0.0.0.0".to_string())?,
            port: env_or("PORT", 3000)?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
            business_utc_offset_hours,
            cors_origins: parse_csv(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: MySqlPool,
    pub settings: Settings,
    pub report_service: ReportService,
    pub i18n_store: I18nStore,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = MySqlPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(settings.db_acquire_timeout_secs))
            .connect(&settings.database_url)
            .await
            .context("could not connect to the reporting database")?;

        tracing::info!("✅ Connected to the reporting database");

        Ok(Self::from_pool(db_pool, settings))
    }

    // Wires the services around an existing pool.
    pub fn from_pool(db_pool: MySqlPool, settings: Settings) -> Self {
        let report_repo = ReportRepository::new(db_pool.clone());
        let report_service = ReportService::new(report_repo);

        Self {
            db_pool,
            settings,
            report_service,
            i18n_store: I18nStore::new(),
        }
    }
}
