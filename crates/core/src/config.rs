use serde::Deserialize;

/// Root application configuration. Loaded from an optional
/// `config/loyalty-insight.toml` file and environment variables with the
/// prefix `LOYALTY_INSIGHT__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// ─── Pipeline Config ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Root of the static per-domain datasets (`<data_dir>/<domain>/*.json`).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Assumed number of customers a campaign reaches when the caller
    /// does not supply one.
    #[serde(default = "default_audience_size")]
    pub default_audience_size: u32,
    /// Upper bound on customers analyzed concurrently.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

// ─── LLM Config ─────────────────────────────────────────────────────────────

/// Settings for the chat-completions endpoint used for explanations.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_enabled")]
    pub enabled: bool,
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Empty means "read `GROQ_API_KEY` from the environment".
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

// Default functions
fn default_node_id() -> String {
    "insight-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_data_dir() -> String {
    "data".to_string()
}
fn default_audience_size() -> u32 {
    1000
}
fn default_max_concurrency() -> usize {
    16
}
fn default_llm_enabled() -> bool { true }
fn default_llm_endpoint() -> String { "https://api.groq.com/openai/v1".to_string() }
fn default_llm_model() -> String { "llama-3.3-70b-versatile".to_string() }
fn default_llm_temperature() -> f32 { 0.3 }
fn default_llm_max_tokens() -> u32 { 300 }
fn default_llm_timeout_ms() -> u64 { 20_000 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_audience_size: default_audience_size(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_llm_enabled(),
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: String::new(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_ms: default_llm_timeout_ms(),
        }
    }
}

impl LlmConfig {
    /// The configured key, or `GROQ_API_KEY` when none is configured.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            pipeline: PipelineConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/loyalty-insight").required(false))
            .add_source(
                config::Environment::with_prefix("LOYALTY_INSIGHT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pipeline.default_audience_size, 1000);
        assert_eq!(config.api.http_port, 8080);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.max_tokens, 300);
    }

    #[test]
    fn test_empty_source_deserializes_to_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.node_id, "insight-01");
        assert_eq!(config.pipeline.max_concurrency, 16);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_configured_api_key_wins() {
        let llm = LlmConfig {
            api_key: "gsk-configured".to_string(),
            ..Default::default()
        };
        assert_eq!(llm.resolved_api_key().as_deref(), Some("gsk-configured"));
    }
}
