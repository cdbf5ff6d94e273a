//! Provider router: selects the completion backend based on config.

use std::collections::HashMap;
use std::sync::Arc;
use reelbot_core::error::ProviderError;
use reelbot_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes completion requests to the configured backend.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get the default provider, or explain why there is none.
    pub fn require_default(&self) -> Result<Arc<dyn Provider>, ProviderError> {
        self.default()
            .ok_or_else(|| ProviderError::NotConfigured(self.default_provider.clone()))
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Every `[providers.*]` table becomes an OpenAI-compatible provider. The
/// default provider is always registered, falling back to the top-level key.
pub fn build_from_config(config: &reelbot_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        let provider: Arc<dyn Provider> =
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key));
        router.register(name.clone(), provider);
    }

    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        router.register(
            config.default_provider.clone(),
            Arc::new(OpenAiCompatProvider::new(
                &config.default_provider,
                &base_url,
                &api_key,
            )),
        );
    }

    router
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "groq" => "https://api.groq.com/openai/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
