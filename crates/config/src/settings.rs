//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{calls, endpoints, timeouts};
use crate::{CityCatalog, ConfigError};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    /// All validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,

    /// Conversational AI provider and call provisioning
    #[serde(default)]
    pub retell: RetellConfig,

    /// Knowledge-base fallback service
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    /// Phone fallback and call defaults
    #[serde(default)]
    pub calls: CallsConfig,

    /// Transcript webhook
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Booking flow behavior
    #[serde(default)]
    pub booking: BookingConfig,

    /// Conversation store limits
    #[serde(default)]
    pub sessions: SessionConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_integrations()?;
        self.validate_sessions()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if server.auth.enabled && server.auth.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: "server.auth.api_key".to_string(),
                message: "API key must be set when auth is enabled".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 Only http://localhost:3000 will be allowed."
            );
        }

        Ok(())
    }

    fn validate_integrations(&self) -> Result<(), ConfigError> {
        if self.retell.conversation_timeout_secs == 0 || self.retell.call_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retell".to_string(),
                message: "Provider timeouts must be at least 1 second".to_string(),
            });
        }

        if self.knowledge_base.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "knowledge_base.timeout_secs".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.calls.phone_number.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "calls.phone_number".to_string(),
                message: "A fallback phone number is required".to_string(),
            });
        }

        if self.environment.is_production() && !self.retell.has_usable_api_key() {
            tracing::warn!("No usable provider API key configured; chat will use the knowledge base");
        }

        Ok(())
    }

    fn validate_sessions(&self) -> Result<(), ConfigError> {
        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.sessions.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.timeout_secs".to_string(),
                message: "Must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

/// Bearer API-key authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Set via BBQ_ASSISTANT__SERVER__AUTH__API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Paths that bypass authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/".to_string(),
        "/health".to_string(),
        "/ready".to_string(),
        "/metrics".to_string(),
    ]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            public_paths: default_public_paths(),
        }
    }
}

/// Retell conversational AI and web-call provisioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetellConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_retell_base_url")]
    pub base_url: String,

    /// Secondary provisioning tier
    #[serde(default = "default_batch_call_url")]
    pub batch_call_url: String,

    /// Agent used when a request names none
    #[serde(default)]
    pub default_agent_id: Option<String>,

    /// Reported by the debug endpoint
    #[serde(default)]
    pub knowledge_base_id: Option<String>,

    #[serde(default = "default_conversation_timeout")]
    pub conversation_timeout_secs: u64,

    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Extra attempts on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Hand out a mock call token instead of calling the provider when no key is usable
    #[serde(default = "default_true")]
    pub mock_when_unconfigured: bool,
}

fn default_retell_base_url() -> String {
    endpoints::RETELL_BASE_URL.to_string()
}
fn default_batch_call_url() -> String {
    endpoints::RETELL_BATCH_CALL_URL.to_string()
}
fn default_conversation_timeout() -> u64 {
    timeouts::CONVERSATION_SECS
}
fn default_call_timeout() -> u64 {
    timeouts::CALL_SECS
}
fn default_max_retries() -> u32 {
    2
}

impl RetellConfig {
    /// False for a missing key, the template placeholder, or anything too short to be real.
    pub fn has_usable_api_key(&self) -> bool {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) => key != calls::API_KEY_PLACEHOLDER && key.len() >= calls::MIN_API_KEY_LEN,
            None => false,
        }
    }

    /// Whether any key at all is present
    pub fn api_key_set(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.trim().is_empty())
    }
}

impl Default for RetellConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_retell_base_url(),
            batch_call_url: default_batch_call_url(),
            default_agent_id: None,
            knowledge_base_id: None,
            conversation_timeout_secs: default_conversation_timeout(),
            call_timeout_secs: default_call_timeout(),
            max_retries: default_max_retries(),
            mock_when_unconfigured: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    #[serde(default = "default_kb_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_kb_timeout")]
    pub timeout_secs: u64,
}

fn default_kb_endpoint() -> String {
    endpoints::KNOWLEDGE_BASE_URL.to_string()
}
fn default_kb_timeout() -> u64 {
    timeouts::KNOWLEDGE_BASE_SECS
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            endpoint: default_kb_endpoint(),
            timeout_secs: default_kb_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallsConfig {
    /// Number disclosed when no call session can be provisioned
    #[serde(default = "default_phone_number")]
    pub phone_number: String,

    /// Skip provisioning and always disclose the phone number
    #[serde(default)]
    pub use_direct_phone: bool,

    #[serde(default = "default_call_mode")]
    pub default_mode: String,

    /// Lifetime of mock tokens
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
}

fn default_phone_number() -> String {
    calls::DEFAULT_PHONE_NUMBER.to_string()
}
fn default_call_mode() -> String {
    "phone".to_string()
}
fn default_token_ttl() -> i64 {
    30
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            phone_number: default_phone_number(),
            use_direct_phone: false,
            default_mode: default_call_mode(),
            token_ttl_minutes: default_token_ttl(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Base URL; transcripts go to `{url}/chatbot-log`
    #[serde(default)]
    pub url: Option<String>,
}

/// What a negative confirmation does to slots collected so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Clear outlet, reservation, party size, contact and confirmation
    #[default]
    ClearBookingSlots,
    /// Leave stale slots in place
    KeepSlots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStrategy {
    /// Process-wide counter with a random starting point
    #[default]
    Counter,
    /// Independent random draw per booking
    Random,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingConfig {
    /// YAML city/outlet catalog; built-in table when unset
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default)]
    pub restart_policy: RestartPolicy,

    #[serde(default)]
    pub reference_strategy: ReferenceStrategy,
}

impl BookingConfig {
    /// Catalog from `catalog_path`, or the built-in one
    pub fn load_catalog(&self) -> Result<CityCatalog, ConfigError> {
        match self.catalog_path.as_deref() {
            Some(path) => CityCatalog::load(path),
            None => Ok(CityCatalog::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time before a conversation is evicted
    #[serde(default = "default_session_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_max_sessions() -> usize {
    10_000
}
fn default_session_timeout() -> u64 {
    1800
}
fn default_cleanup_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            timeout_secs: default_session_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    /// Install the Prometheus recorder
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Sources, later ones winning: `config/default`, `config/{env}`, then
/// `BBQ_ASSISTANT__*` environment variables.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Same as [`load_settings`] with the file sources read from `dir`
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder
        .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false));

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&dir.join(env_name).to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("BBQ_ASSISTANT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
