use anyhow::Context;
use time::{macros::format_description, UtcOffset};

use crate::consumption::BarcodePolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub barcode_policy: BarcodePolicy,
    /// Offset that defines calendar days in nutrition statistics.
    pub stats_utc_offset: UtcOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let barcode_policy = match std::env::var("BARCODE_POLICY") {
            Ok(v) => v.parse::<BarcodePolicy>().context("invalid BARCODE_POLICY")?,
            Err(_) => BarcodePolicy::default(),
        };
        let stats_utc_offset = match std::env::var("STATS_UTC_OFFSET") {
            Ok(v) => parse_offset(&v).context("invalid STATS_UTC_OFFSET")?,
            Err(_) => UtcOffset::UTC,
        };
        Ok(Self {
            database_url,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            barcode_policy,
            stats_utc_offset,
        })
    }
}

/// Parses `+HH:MM` / `-HH:MM`.
fn parse_offset(v: &str) -> Result<UtcOffset, time::error::Parse> {
    UtcOffset::parse(v, format_description!("[offset_hour sign:mandatory]:[offset_minute]"))
}
