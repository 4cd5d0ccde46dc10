use std::env;
use std::fmt;
use url::Url;

pub const HOST: &str = "0.0.0.0";
pub const PORT: u16 = 8080;

pub const UPLOAD_FOLDER: &str = "static/uploads";
pub const STATIC_FOLDER: &str = "static";
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

pub const SESSION_COOKIE: &str = "trip_session";
pub const SESSION_LIFETIME_HOURS: i64 = 24;
pub const DEFAULT_SECRET_KEY: &str = "default_secret_key";

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const GROQ_TEMPERATURE: f32 = 0.3;

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort(String),
    InvalidUrl(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(raw) => write!(f, "Invalid PORT value: {}", raw),
            ConfigError::InvalidUrl(err) => write!(f, "Invalid GROQ_BASE_URL: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub groq_api_key: Option<String>,
    pub groq_base_url: Url,
    pub secret_key: String,
    pub upload_folder: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "<set>"))
            .field("groq_base_url", &self.groq_base_url.as_str())
            .field("upload_folder", &self.upload_folder)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => PORT,
        };

        let groq_api_key = env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());
        let base_url = env::var("GROQ_BASE_URL").unwrap_or_else(|_| GROQ_BASE_URL.to_string());
        let groq_base_url =
            Url::parse(&base_url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        let secret_key = env::var("SECRET_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string());

        Ok(Self {
            host,
            port,
            groq_api_key,
            groq_base_url,
            secret_key,
            upload_folder: UPLOAD_FOLDER.to_string(),
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}
