use crate::utils::error::{AppError, AppResult};

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
const DEFAULT_JSON_LIMIT: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB,
    Memory,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub json_limit: usize,
    /// `None` disables the generation endpoint
    pub openai: Option<OpenAiConfig>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got '{}'", p)))?,
            None => 3001,
        };

        let store_backend = match var("STORE_BACKEND").as_deref() {
            None | Some("mongodb") | Some("mongo") => StoreBackend::MongoDB,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "STORE_BACKEND must be 'mongodb' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let database_url = var("DATABASE_URL").or_else(|| var("MONGO_URI"));
        if store_backend == StoreBackend::MongoDB && database_url.is_none() {
            return Err(AppError::Config("DATABASE_URL must be set".to_string()));
        }

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]);

        let json_limit = var("JSON_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_JSON_LIMIT);

        let openai = var("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            api_base: var("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        });

        Ok(Self {
            host,
            port,
            store_backend,
            database_url,
            cors_allowed_origins,
            json_limit,
            openai,
        })
    }
}
