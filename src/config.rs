//! Process configuration, read once at startup from the environment (and `.env`).

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PDF_API_URL: &str = "https://api.html2pdf.app/v1/generate";
pub const DEFAULT_PDF_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid APP_PORT '{0}'")]
    InvalidPort(String),
    #[error("invalid APP_HOST '{0}'")]
    InvalidHost(String),
    #[error("invalid PDF_TIMEOUT_SECS '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
    #[error("invalid PDF_RENDERER '{0}': expected auto, remote, headless or none")]
    InvalidRenderer(String),
    #[error("invalid DEFAULT_OUTPUT '{0}': expected pdf or html")]
    InvalidOutput(String),
    #[error("invalid boolean for {key}: '{value}'")]
    InvalidBool { key: &'static str, value: String },
}

/// Credential that never appears in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Where the process is running; reported in headers and the health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
    Serverless,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "serverless" | "vercel" => Self::Serverless,
            _ => Self::Development,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Development => "Local/Development",
            Self::Production => "Production",
            Self::Serverless => "Serverless",
        }
    }
}

/// Which PDF backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererSelection {
    /// Remote API when a key is configured, else a local browser, else none.
    Auto,
    Remote,
    Headless,
    None,
}

impl RendererSelection {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "remote" | "api" => Ok(Self::Remote),
            "headless" | "local" | "browser" => Ok(Self::Headless),
            "none" | "off" | "disabled" => Ok(Self::None),
            _ => Err(ConfigError::InvalidRenderer(value.to_string())),
        }
    }
}

/// Document representation returned when the caller does not ask for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "html" => Some(Self::Html),
            _ => None,
        }
    }
}

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
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub selection: RendererSelection,
    pub api_key: Option<Secret>,
    pub api_url: String,
    pub timeout: Duration,
    pub chrome_path: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            selection: RendererSelection::Auto,
            api_key: None,
            api_url: DEFAULT_PDF_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_PDF_TIMEOUT_SECS),
            chrome_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub default_format: OutputFormat,
    pub escape_html: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Pdf,
            escape_html: true,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub renderer: RendererConfig,
    pub output: OutputConfig,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::Development,
            server: ServerConfig::default(),
            renderer: RendererConfig::default(),
            output: OutputConfig::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = if var("VERCEL").as_deref() == Some("1") {
            AppEnvironment::Serverless
        } else {
            AppEnvironment::parse(&var("APP_ENV").unwrap_or_default())
        };

        let host = var("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8080,
        };

        let timeout = match var("PDF_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_PDF_TIMEOUT_SECS),
        };

        let selection = RendererSelection::parse(&var("PDF_RENDERER").unwrap_or_default())?;

        let api_key = ["PDF_API_KEY", "pdf_api_key", "NUXT_PDF_API_KEY"]
            .iter()
            .find_map(|&key| var(key))
            .map(Secret::new);

        let default_format = match var("DEFAULT_OUTPUT") {
            Some(raw) => OutputFormat::parse(&raw).ok_or(ConfigError::InvalidOutput(raw))?,
            None => OutputFormat::Pdf,
        };

        let escape_html = match var("TEMPLATE_ESCAPE_HTML") {
            Some(raw) => parse_bool("TEMPLATE_ESCAPE_HTML", &raw)?,
            None => true,
        };

        let cors_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty() && origin != "*")
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            renderer: RendererConfig {
                selection,
                api_key,
                api_url: var("PDF_API_URL").unwrap_or_else(|| DEFAULT_PDF_API_URL.to_string()),
                timeout,
                chrome_path: var("CHROME_PATH").map(PathBuf::from),
            },
            output: OutputConfig {
                default_format,
                escape_html,
            },
            cors_origins,
        })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.renderer.selection, RendererSelection::Auto);
        assert_eq!(config.renderer.timeout, Duration::from_secs(30));
        assert_eq!(config.renderer.api_url, DEFAULT_PDF_API_URL);
        assert!(config.renderer.api_key.is_none());
        assert_eq!(config.output.default_format, OutputFormat::Pdf);
        assert!(config.output.escape_html);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_vercel_flag_means_serverless() {
        let config = load(&[("VERCEL", "1"), ("APP_ENV", "production")]).unwrap();
        assert_eq!(config.environment, AppEnvironment::Serverless);
    }

    #[test]
    fn test_api_key_aliases_in_priority_order() {
        let config = load(&[("NUXT_PDF_API_KEY", "nuxt"), ("pdf_api_key", "lower")]).unwrap();
        assert_eq!(config.renderer.api_key.unwrap().expose(), "lower");
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = load(&[("PDF_API_KEY", "super-secret-key")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("Secret(***)"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(load(&[("APP_PORT", "abc")]), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(
            load(&[("PDF_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert!(matches!(
            load(&[("PDF_RENDERER", "magic")]),
            Err(ConfigError::InvalidRenderer(_))
        ));
        assert!(matches!(
            load(&[("DEFAULT_OUTPUT", "docx")]),
            Err(ConfigError::InvalidOutput(_))
        ));
        assert!(matches!(
            load(&[("TEMPLATE_ESCAPE_HTML", "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
    }

    #[test]
    fn test_cors_origins_list() {
        let config = load(&[(
            "CORS_ALLOWED_ORIGINS",
            "https://a.example, https://b.example ,",
        )])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            host: "localhost".to_string(),
            port: 9000,
        };
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
    }
}
