use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://www.selloutweb.co.uk/application";
const DEFAULT_DOCUMENT_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_SIGNATURE_MAX_BYTES: u64 = 5 * 1024 * 1024;

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
    pub api: ApiConfig,
    pub uploads: UploadLimits,
    pub navigation: NavigationConfig,
    pub catalog_path: Option<PathBuf>,
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

        let raw_base_url =
            env::var("ADMISSIONS_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let base_url = parse_base_url(&raw_base_url)?;
        let request_timeout = match read_u64("ADMISSIONS_REQUEST_TIMEOUT_SECS", 30)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let redirect_delay = Duration::from_secs(read_u64("ADMISSIONS_REDIRECT_DELAY_SECS", 3)?);
        let home_path = env::var("ADMISSIONS_HOME_PATH").unwrap_or_else(|_| "/".to_string());

        let uploads = UploadLimits {
            document_max_bytes: read_u64(
                "ADMISSIONS_DOCUMENT_MAX_BYTES",
                DEFAULT_DOCUMENT_MAX_BYTES,
            )?,
            signature_max_bytes: read_u64(
                "ADMISSIONS_SIGNATURE_MAX_BYTES",
                DEFAULT_SIGNATURE_MAX_BYTES,
            )?,
        };

        let catalog_path = env::var("ADMISSIONS_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            api: ApiConfig {
                base_url,
                request_timeout,
            },
            uploads,
            navigation: NavigationConfig {
                redirect_delay,
                home_path,
            },
            catalog_path,
        })
    }
}

fn read_u64(variable: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        Err(_) => Ok(default),
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidApiBaseUrl {
        value: raw.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::InvalidApiBaseUrl {
            value: raw.to_string(),
        }),
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

/// Where the external admissions backend lives and how long to wait on it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub request_timeout: Option<Duration>,
}

impl ApiConfig {
    /// Joins an operation path such as `apply` onto the base URL, keeping the
    /// base path segment (`/application`) intact.
    pub fn endpoint(&self, operation: &str) -> String {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let relative = operation.trim_start_matches('/');
        match base.join(relative) {
            Ok(url) => url.into(),
            Err(_) => format!("{}{relative}", base.as_str()),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Client-side size limits for attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub document_max_bytes: u64,
    pub signature_max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            document_max_bytes: DEFAULT_DOCUMENT_MAX_BYTES,
            signature_max_bytes: DEFAULT_SIGNATURE_MAX_BYTES,
        }
    }
}

/// Post-success redirect behavior for the token flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationConfig {
    pub redirect_delay: Duration,
    pub home_path: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            redirect_delay: Duration::from_secs(3),
            home_path: "/".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidApiBaseUrl { value: String },
    InvalidNumber { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidApiBaseUrl { value } => write!(
                f,
                "ADMISSIONS_API_BASE_URL must be an absolute http(s) URL, got '{value}'"
            ),
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidApiBaseUrl { .. }
            | ConfigError::InvalidNumber { .. } => None,
        }
    }
}
