//! Configuração explícita do cliente (sem estado global de módulo)

use serde::{Deserialize, Serialize};

/// URL base da API Wrike v4
pub const DEFAULT_BASE_URL: &str = "https://www.wrike.com/api/v4";

/// Parâmetros de conexão repassados ao `WrikeClient` na construção
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrikeConfig {
    /// Token permanente ou OAuth2 (enviado como `bearer`)
    pub api_token: String,

    /// URL base, sem barra final
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout total por requisição (segundos)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout de conexão (segundos)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl WrikeConfig {
    /// Configuração padrão para um token (URL oficial, 30s/5s)
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Substitui a URL base (útil para servidores mock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Substitui os timeouts
    pub fn with_timeouts(mut self, total_secs: u64, connect_secs: u64) -> Self {
        self.timeout_secs = total_secs;
        self.connect_timeout_secs = connect_secs;
        self
    }
}
