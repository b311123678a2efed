use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::staffing::lifecycle::LifecycleSettings;
use crate::workflows::staffing::planning::MAX_REVIEW_MONTHS;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub planning: PlanningConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let default_months = env::var("PLANNING_DEFAULT_MONTHS")
            .unwrap_or_else(|_| "3".to_string())
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|months| (1..=MAX_REVIEW_MONTHS).contains(months))
            .ok_or(ConfigError::InvalidDefaultMonths)?;
        let mail_domain =
            env::var("PLANNING_MAIL_DOMAIN").unwrap_or_else(|_| "example.com".to_string());
        let system_user = env::var("PLANNING_SYSTEM_USER").unwrap_or_else(|_| "-".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            planning: PlanningConfig {
                default_months,
                mail_domain,
                system_user,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Planning defaults and lead notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningConfig {
    /// Months covered by a review when the request does not say.
    pub default_months: u32,
    pub mail_domain: String,
    pub system_user: String,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        let settings = LifecycleSettings::default();
        Self {
            default_months: 3,
            mail_domain: settings.mail_domain,
            system_user: settings.system_user,
        }
    }
}

impl PlanningConfig {
    pub fn lifecycle_settings(&self) -> LifecycleSettings {
        LifecycleSettings {
            mail_domain: self.mail_domain.clone(),
            system_user: self.system_user.clone(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDefaultMonths,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDefaultMonths => write!(
                f,
                "PLANNING_DEFAULT_MONTHS must be a whole number between 1 and {}",
                MAX_REVIEW_MONTHS
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidDefaultMonths => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
