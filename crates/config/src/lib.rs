//! Process configuration for ProjectDesk
//!
//! All settings come from environment variables and are read once at
//! startup. A missing mail identity or credential disables confirmation
//! mails instead of failing; a missing database URL falls back to a local
//! default.

use std::fmt;
use std::str::FromStr;

pub mod env;
pub mod error;
pub mod validator;

pub use env::{process_env, Lookup};
pub use error::ConfigError;
pub use validator::*;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/projectdesk";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_LOG_FORMAT: &str = "pretty";

/// Where records are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local, lost on exit
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownStoreBackend(other.to_string())),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub backend: StoreBackend,
}

/// Outbound mail identity
#[derive(Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub user: String,
    pub password: String,
    pub from: Option<String>,
    pub smtp_host: String,
}

impl MailSettings {
    /// The "from" mailbox: the override if set, otherwise the identity
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.user)
    }
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("user", &self.user)
            .field("password", &"********")
            .field("from", &self.from)
            .field("smtp_host", &self.smtp_host)
            .finish()
    }
}

/// Complete process configuration
#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub http: HttpSettings,
    pub database: DatabaseSettings,
    /// `None` when either the identity or the credential is missing
    pub mail: Option<MailSettings>,
    pub log_format: String,
    pub metrics_port: Option<u16>,
    /// Variables that were set but ignored, e.g. a lone `EMAIL_USER`
    pub ignored: Vec<String>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl DeskConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup(lookup: &impl Lookup) -> Result<Self, ConfigError> {
        let mut defaults_applied = Vec::new();
        let mut ignored = Vec::new();

        let mut text = |var: &str, default: &str| {
            let (value, defaulted) = env::get_or_default(lookup, var, default);
            if defaulted {
                defaults_applied.push(DefaultApplied {
                    field: var.to_string(),
                    value: default.to_string(),
                });
            }
            value
        };

        let host = text("HOST", DEFAULT_HOST);
        let database_url = text("DATABASE_URL", DEFAULT_DATABASE_URL);
        let smtp_host = text("SMTP_HOST", DEFAULT_SMTP_HOST);
        let log_format = text("LOG_FORMAT", DEFAULT_LOG_FORMAT);
        let backend: StoreBackend = text("STORE_BACKEND", StoreBackend::default().as_str()).parse()?;

        let port = match env::parse_optional::<u16>(lookup, "PORT")? {
            Some(port) => port,
            None => {
                defaults_applied.push(DefaultApplied {
                    field: "PORT".to_string(),
                    value: DEFAULT_PORT.to_string(),
                });
                DEFAULT_PORT
            }
        };

        let max_connections = match env::parse_optional::<u32>(lookup, "DATABASE_MAX_CONNECTIONS")? {
            Some(n) => n,
            None => {
                defaults_applied.push(DefaultApplied {
                    field: "DATABASE_MAX_CONNECTIONS".to_string(),
                    value: DEFAULT_MAX_CONNECTIONS.to_string(),
                });
                DEFAULT_MAX_CONNECTIONS
            }
        };

        let metrics_port = env::parse_optional::<u16>(lookup, "METRICS_PORT")?;

        let user = env::get_nonblank(lookup, "EMAIL_USER");
        let password = env::get_nonblank(lookup, "EMAIL_PASS");
        let from = env::get_nonblank(lookup, "EMAIL_FROM");

        let mail = match (user, password) {
            (Some(user), Some(password)) => Some(MailSettings {
                user,
                password,
                from,
                smtp_host,
            }),
            (user, password) => {
                if user.is_some() {
                    ignored.push("EMAIL_USER".to_string());
                }
                if password.is_some() {
                    ignored.push("EMAIL_PASS".to_string());
                }
                if from.is_some() {
                    ignored.push("EMAIL_FROM".to_string());
                }
                None
            }
        };

        Ok(Self {
            http: HttpSettings { host, port },
            database: DatabaseSettings {
                url: database_url,
                max_connections,
                backend,
            },
            mail,
            log_format,
            metrics_port,
            ignored,
            defaults_applied,
        })
    }

    /// Whether confirmation mails can be sent
    pub fn mail_enabled(&self) -> bool {
        self.mail.is_some()
    }

    /// Database URL with any password replaced, for display
    pub fn masked_database_url(&self) -> String {
        match url::Url::parse(&self.database.url) {
            Ok(mut parsed) if parsed.password().is_some() => {
                let _ = parsed.set_password(Some("********"));
                parsed.to_string()
            }
            Ok(parsed) => parsed.to_string(),
            Err(_) => self.database.url.clone(),
        }
    }
}
