//! Backend selection.
//!
//! `API_HOST` picks one of the hosted chat-completion backends; each backend
//! reads its own endpoint, credential, and model variables. Resolution goes
//! through a lookup closure so it can be exercised without touching the
//! process environment.

use std::time::Duration;

use pipeline::ModelId;
use thiserror::Error;

pub const GITHUB_BASE_URL: &str = "https://models.github.ai/inference";
pub const GITHUB_DEFAULT_MODEL: &str = "openai/gpt-4o";
pub const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1";
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.1:latest";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

/// Default HTTP timeout for one completion request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {name} is required when API_HOST={host}")]
    MissingVariable { host: ApiHost, name: &'static str },

    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },
}

/// Hosted backend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiHost {
    Azure,
    Github,
    Ollama,
    OpenAi,
}

impl ApiHost {
    /// Maps an `API_HOST` value. Unset means GitHub Models; any value other
    /// than `azure`, `github`, or `ollama` means OpenAI.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("github") => Self::Github,
            Some("azure") => Self::Azure,
            Some("ollama") => Self::Ollama,
            Some(_) => Self::OpenAi,
        }
    }
}

impl std::fmt::Display for ApiHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Azure => "azure",
            Self::Github => "github",
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        })
    }
}

/// How the credential is attached to requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Keyless local server.
    None,
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// `api-key: <key>` (Azure OpenAI key auth).
    ApiKeyHeader(String),
}

// Never print secrets.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Self::ApiKeyHeader(_) => f.write_str("ApiKeyHeader(<redacted>)"),
        }
    }
}

/// Fully resolved connection settings for one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub host: ApiHost,
    /// Base URL without a trailing slash; `/chat/completions` is appended.
    pub base_url: String,
    pub model: ModelId,
    pub credential: Credential,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Resolves the backend from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the backend from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let host = ApiHost::from_setting(var("API_HOST").as_deref());
        let required = |name: &'static str| var(name).ok_or(ConfigError::MissingVariable { host, name });

        let (base_url, model, credential) = match host {
            ApiHost::Azure => {
                let endpoint = required("AZURE_OPENAI_ENDPOINT")?;
                (
                    format!("{}/openai/v1", endpoint.trim_end_matches('/')),
                    required("AZURE_OPENAI_CHAT_DEPLOYMENT")?,
                    Credential::ApiKeyHeader(required("AZURE_OPENAI_API_KEY")?),
                )
            }
            ApiHost::Github => (
                GITHUB_BASE_URL.to_string(),
                var("GITHUB_MODEL").unwrap_or_else(|| GITHUB_DEFAULT_MODEL.to_string()),
                Credential::Bearer(required("GITHUB_TOKEN")?),
            ),
            ApiHost::Ollama => (
                var("OLLAMA_ENDPOINT").unwrap_or_else(|| OLLAMA_DEFAULT_ENDPOINT.to_string()),
                var("OLLAMA_MODEL").unwrap_or_else(|| OLLAMA_DEFAULT_MODEL.to_string()),
                Credential::None,
            ),
            ApiHost::OpenAi => (
                OPENAI_BASE_URL.to_string(),
                var("OPENAI_MODEL").unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
                Credential::Bearer(required("OPENAI_API_KEY")?),
            ),
        };

        let timeout = match var("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: "LLM_TIMEOUT_SECS",
                    message: format!("expected a positive number of seconds, got {raw:?}"),
                })?,
            None => DEFAULT_TIMEOUT,
        };

        let model = ModelId::new(model).ok_or(ConfigError::InvalidValue {
            name: "model",
            message: "model name must not be empty".to_string(),
        })?;

        Ok(Self {
            host,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            credential,
            timeout,
        })
    }

    /// Full URL of the chat-completions endpoint.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(vars: &[(&str, &str)]) -> Result<BackendConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BackendConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn github_is_the_default() {
        let cfg = resolve(&[("GITHUB_TOKEN", "ghp_x")]).unwrap();
        assert_eq!(cfg.host, ApiHost::Github);
        assert_eq!(
            cfg.chat_completions_url(),
            "https://models.github.ai/inference/chat/completions"
        );
        assert_eq!(cfg.model.as_str(), GITHUB_DEFAULT_MODEL);
        assert_eq!(cfg.credential, Credential::Bearer("ghp_x".into()));
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn github_requires_a_token() {
        assert_eq!(
            resolve(&[("API_HOST", "github")]).unwrap_err(),
            ConfigError::MissingVariable {
                host: ApiHost::Github,
                name: "GITHUB_TOKEN"
            }
        );
    }

    #[test]
    fn azure_uses_the_v1_endpoint_and_deployment() {
        let cfg = resolve(&[
            ("API_HOST", "azure"),
            ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com/"),
            ("AZURE_OPENAI_CHAT_DEPLOYMENT", "gpt-4o-mini"),
            ("AZURE_OPENAI_API_KEY", "k"),
        ])
        .unwrap();
        assert_eq!(
            cfg.chat_completions_url(),
            "https://res.openai.azure.com/openai/v1/chat/completions"
        );
        assert_eq!(cfg.model.as_str(), "gpt-4o-mini");
        assert_eq!(cfg.credential, Credential::ApiKeyHeader("k".into()));
    }

    #[test]
    fn azure_without_deployment_is_an_error() {
        let err = resolve(&[
            ("API_HOST", "azure"),
            ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com"),
            ("AZURE_OPENAI_API_KEY", "k"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable {
                name: "AZURE_OPENAI_CHAT_DEPLOYMENT",
                ..
            }
        ));
    }

    #[test]
    fn ollama_needs_no_credentials() {
        let cfg = resolve(&[("API_HOST", "ollama")]).unwrap();
        assert_eq!(cfg.base_url, OLLAMA_DEFAULT_ENDPOINT);
        assert_eq!(cfg.model.as_str(), OLLAMA_DEFAULT_MODEL);
        assert_eq!(cfg.credential, Credential::None);

        let cfg = resolve(&[
            ("API_HOST", "ollama"),
            ("OLLAMA_ENDPOINT", "http://gpu-box:11434/v1/"),
            ("OLLAMA_MODEL", "qwen2.5"),
        ])
        .unwrap();
        assert_eq!(cfg.chat_completions_url(), "http://gpu-box:11434/v1/chat/completions");
        assert_eq!(cfg.model.as_str(), "qwen2.5");
    }

    #[test]
    fn unknown_hosts_fall_back_to_openai() {
        let cfg = resolve(&[("API_HOST", "openai"), ("OPENAI_API_KEY", "sk")]).unwrap();
        assert_eq!(cfg.host, ApiHost::OpenAi);
        let cfg = resolve(&[("API_HOST", "somewhere"), ("OPENAI_API_KEY", "sk")]).unwrap();
        assert_eq!(cfg.host, ApiHost::OpenAi);
        assert_eq!(cfg.model.as_str(), OPENAI_DEFAULT_MODEL);
    }

    #[test]
    fn timeout_must_be_positive() {
        let cfg = resolve(&[("GITHUB_TOKEN", "t"), ("LLM_TIMEOUT_SECS", "30")]).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(resolve(&[("GITHUB_TOKEN", "t"), ("LLM_TIMEOUT_SECS", "0")]).is_err());
        assert!(resolve(&[("GITHUB_TOKEN", "t"), ("LLM_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn credentials_are_redacted_in_debug_output() {
        let cfg = resolve(&[("GITHUB_TOKEN", "super-secret")]).unwrap();
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }
}
