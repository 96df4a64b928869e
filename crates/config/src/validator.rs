use thiserror::Error;

use crate::{DeskConfig, StoreBackend};

const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("PORT must be greater than 0")]
    ZeroPort,

    #[error("DATABASE_MAX_CONNECTIONS must be greater than 0")]
    ZeroPoolSize,

    #[error("Invalid DATABASE_URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("DATABASE_URL scheme must be postgres or postgresql, got: {0}")]
    UnsupportedDatabaseScheme(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("METRICS_PORT {0} collides with the HTTP port")]
    MetricsPortCollision(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &DeskConfig) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.defaults_applied = config.defaults_applied.clone();

    validate_http(config, &mut report);
    validate_database(config, &mut report);
    validate_mail(config, &mut report);

    if !LOG_FORMATS.contains(&config.log_format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(config.log_format.clone()));
    }

    report
}

fn validate_http(config: &DeskConfig, report: &mut ValidationReport) {
    if config.http.port == 0 {
        report.add_error(ValidationError::ZeroPort);
    }

    if let Some(metrics_port) = config.metrics_port {
        if metrics_port == config.http.port && metrics_port != 0 {
            report.add_error(ValidationError::MetricsPortCollision(metrics_port));
        }
    }
}

fn validate_database(config: &DeskConfig, report: &mut ValidationReport) {
    let database = &config.database;

    if database.backend == StoreBackend::Memory {
        report.add_warning(
            "STORE_BACKEND",
            "In-memory store selected; records are lost when the process exits",
        );
        return;
    }

    if database.max_connections == 0 {
        report.add_error(ValidationError::ZeroPoolSize);
    }

    match url::Url::parse(&database.url) {
        Ok(parsed) => {
            if !matches!(parsed.scheme(), "postgres" | "postgresql") {
                report.add_error(ValidationError::UnsupportedDatabaseScheme(
                    parsed.scheme().to_string(),
                ));
            }
        }
        Err(e) => report.add_error(ValidationError::InvalidDatabaseUrl(e.to_string())),
    }
}

fn validate_mail(config: &DeskConfig, report: &mut ValidationReport) {
    if config.mail.is_none() {
        report.add_warning(
            "EMAIL_USER",
            "Mail identity or credential not set; order confirmation mails are disabled",
        );
    }

    for var in &config.ignored {
        report.add_warning(var, "Ignored because EMAIL_USER and EMAIL_PASS must both be set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> DeskConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DeskConfig::from_lookup(&move |key: &str| map.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_default_config_is_valid_with_mail_warning() {
        let report = validate_config(&config(&[]));

        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.field == "EMAIL_USER"));
        assert!(!report.defaults_applied.is_empty());
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let report = validate_config(&config(&[("DATABASE_URL", "mongodb://localhost:27017/desk")]));

        assert!(!report.is_valid());
        assert_eq!(
            report.errors,
            vec![ValidationError::UnsupportedDatabaseScheme("mongodb".to_string())]
        );
    }

    #[test]
    fn test_memory_backend_skips_database_checks() {
        let report = validate_config(&config(&[
            ("STORE_BACKEND", "memory"),
            ("DATABASE_URL", "not a url"),
        ]));

        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.field == "STORE_BACKEND"));
    }

    #[test]
    fn test_invalid_log_format_and_port_collision() {
        let report = validate_config(&config(&[
            ("LOG_FORMAT", "xml"),
            ("PORT", "9000"),
            ("METRICS_PORT", "9000"),
        ]));

        assert!(report.errors.contains(&ValidationError::InvalidLogFormat("xml".to_string())));
        assert!(report.errors.contains(&ValidationError::MetricsPortCollision(9000)));
    }

    #[test]
    fn test_lone_credential_is_reported() {
        let report = validate_config(&config(&[("EMAIL_PASS", "app-password")]));

        assert!(report.warnings.iter().any(|w| w.field == "EMAIL_PASS"));
    }
}
