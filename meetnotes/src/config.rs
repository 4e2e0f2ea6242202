use std::env;
use std::path::PathBuf;

/// Upload and JSON body ceiling shared by every body-carrying route.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

pub const DEFAULT_LLM_MODEL: &str = "groq/llama-3.1-8b-instant";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// First non-empty value among `vars`, in order.
fn env_first(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .map(|val| val.trim().to_string())
        .find(|val| !val.is_empty())
}

/// Parse `CORS_ORIGIN`.
/// Format: comma-separated origins, e.g. `https://notes.example.com,http://localhost:5173`.
/// An empty list (unset, blank, or containing `*`) means any origin.
pub fn parse_cors_origins(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let origins: Vec<String> = raw
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        return Vec::new();
    }

    origins
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub rate_limit: RateLimitConfig,
    pub llm: LlmConfig,
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Name reported by the health check.
    pub service_name: String,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    /// Identify clients by the first `X-Forwarded-For` entry instead of the peer address.
    pub trust_proxy: bool,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Largest accepted transcript file, in bytes.
    pub max_file_bytes: usize,
    /// Largest accepted JSON or urlencoded body, in bytes.
    pub json_body_limit: usize,
    /// Where uploads are staged. `None` uses the OS temp dir.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

/// LLM configuration for the chat completion model
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
}

/// Mail transport configuration. Absent when `SMTP_HOST` is unset.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte. When false, STARTTLS is used if offered.
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub timeout_secs: u64,
}

impl MailConfig {
    /// `FROM_EMAIL`, falling back to the SMTP username.
    pub fn from_address(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_BODY_LIMIT,
            json_body_limit: DEFAULT_BODY_LIMIT,
            dir: None,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_secs: 60,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 60,
            temperature: 0.2,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 8080),
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "meetnotes".to_string()),
                cors_origins: parse_cors_origins(env::var("CORS_ORIGIN").ok().as_deref()),
                trust_proxy: parse_env_or("TRUST_PROXY", false),
            },
            upload: UploadConfig {
                max_file_bytes: parse_env_or("UPLOAD_MAX_BYTES", DEFAULT_BODY_LIMIT),
                json_body_limit: parse_env_or("JSON_BODY_LIMIT", DEFAULT_BODY_LIMIT),
                dir: env_first(&["UPLOAD_DIR"]).map(PathBuf::from),
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_env_or("RATE_LIMIT_MAX", 30),
                window_secs: parse_env_or("RATE_LIMIT_WINDOW_SECS", 60),
            },
            llm: LlmConfig {
                model: env_first(&["LLM_MODEL", "GROQ_MODEL"])
                    .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                api_key: env_first(&["LLM_API_KEY", "GROQ_API_KEY"]),
                base_url: env_first(&["LLM_BASE_URL"]),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
                temperature: 0.2,
            },
            mail: env_first(&["SMTP_HOST"]).map(|host| MailConfig {
                host,
                port: parse_env_or("SMTP_PORT", 587),
                secure: parse_env_or("SMTP_SECURE", false),
                username: env_first(&["SMTP_USER"]),
                password: env::var("SMTP_PASS").ok().filter(|pass| !pass.is_empty()),
                from: env_first(&["FROM_EMAIL"]),
                timeout_secs: parse_env_or("SMTP_TIMEOUT", 30),
            }),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that expose OpenAI-compatible chat completion APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["groq", "openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a model on a custom endpoint
    ("local", model)
}
