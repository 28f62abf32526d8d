//! LLM client abstraction and provider selection
//!
//! The chat chain only needs plain completions, so the trait stays small:
//! a single prompt, a prompt with a system message, or a full role-tagged
//! conversation.

use crate::types::{AppError, Result};
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate with conversation history
    async fn generate_with_history(
        &self,
        messages: &[(String, String)], // (role, content) pairs
    ) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2:latest".to_string(),
    ///     temperature: 0.3,
    /// };
    /// ```
    Ollama {
        base_url: String,
        model: String,
        temperature: f32,
    },
}

impl Provider {
    /// Provider described by the `[llm]` config section.
    pub fn from_config(config: &crate::utils::toml_config::LlmConfig) -> Self {
        Provider::Ollama {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's feature is disabled or the base
    /// URL cannot be parsed.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "ollama")]
            Provider::Ollama {
                base_url,
                model,
                temperature,
            } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone(), *temperature)
                    .await?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { model, .. } => Err(AppError::Configuration(format!(
                "Cannot use model '{}': ragchat was built without the 'ollama' feature",
                model
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model the provider will be asked for.
    pub fn model(&self) -> &str {
        match self {
            Provider::Ollama { model, .. } => model,
        }
    }
}

/// Ollama's port when the URL names none.
const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// Split `scheme://host[:port][/...]` into `("scheme://host", port)`.
///
/// IPv6 hosts keep their brackets. Ollama's default port 11434 is used when
/// none is given.
pub fn split_base_url(base_url: &str) -> Result<(String, u16)> {
    let invalid = |reason: &str| {
        AppError::Configuration(format!("Invalid Ollama URL '{}': {}", base_url, reason))
    };

    let url = reqwest::Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("missing host"))?;

    let port = match url.port() {
        Some(port) => port,
        // Url drops a port equal to the scheme's default
        None => match url.port_or_known_default() {
            Some(default) if names_port(base_url, default) => default,
            _ => DEFAULT_OLLAMA_PORT,
        },
    };

    Ok((format!("{}://{}", url.scheme(), host), port))
}

fn names_port(base_url: &str, port: u16) -> bool {
    base_url
        .split_once("://")
        .and_then(|(_, rest)| rest.split(['/', '?', '#']).next())
        .map_or(false, |authority| authority.ends_with(&format!(":{}", port)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::LlmConfig;

    #[test]
    fn test_provider_from_config() {
        let provider = Provider::from_config(&LlmConfig::default());
        assert_eq!(provider.name(), "Ollama");
        assert_eq!(provider.model(), "llama3.2:latest");
        assert_eq!(
            provider,
            Provider::Ollama {
                base_url: "http://localhost:11434".to_string(),
                model: "llama3.2:latest".to_string(),
                temperature: 0.3,
            }
        );
    }

    #[test]
    fn test_split_base_url_full() {
        let (host, port) = split_base_url("http://localhost:11434").unwrap();
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn test_split_base_url_no_port() {
        let (host, port) = split_base_url("https://ollama.internal").unwrap();
        assert_eq!(host, "https://ollama.internal");
        assert_eq!(port, 11434);
    }

    #[test]
    fn test_split_base_url_custom_port_and_path() {
        let (host, port) = split_base_url("http://192.168.1.100:8080/").unwrap();
        assert_eq!(host, "http://192.168.1.100");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_split_base_url_ipv6() {
        let (host, port) = split_base_url("http://[::1]").unwrap();
        assert_eq!(host, "http://[::1]");
        assert_eq!(port, 11434);

        let (host, port) = split_base_url("http://[fe80::2]:8080/api").unwrap();
        assert_eq!(host, "http://[fe80::2]");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_split_base_url_keeps_explicit_scheme_port() {
        let (host, port) = split_base_url("http://ollama.lan:80").unwrap();
        assert_eq!(host, "http://ollama.lan");
        assert_eq!(port, 80);
    }

    #[test]
    fn test_split_base_url_errors() {
        assert!(split_base_url("localhost:11434").is_err());
        assert!(split_base_url("ftp://localhost").is_err());
        assert!(split_base_url("http://").is_err());
        assert!(split_base_url("http://localhost:abc").is_err());
    }
}
