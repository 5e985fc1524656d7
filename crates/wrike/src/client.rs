//! Cliente HTTP para a API do Wrike

use crate::config::WrikeConfig;
use crate::error::{Result, WrikeError};
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Envelope padrão das respostas do Wrike: `{"kind": "...", "data": [...]}`
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Cliente para interagir com a API v4 do Wrike
///
/// Toda a configuração (token, URL base, timeouts) vem de um `WrikeConfig`
/// passado na construção.
#[derive(Clone)]
pub struct WrikeClient {
    http_client: HttpClient,
    api_token: String,
    base_url: String,
}

impl WrikeClient {
    /// Cria um novo cliente com a configuração padrão
    ///
    /// # Timeouts
    ///
    /// - Total: 30s
    /// - Connect: 5s
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::from_config(&WrikeConfig::new(api_token))
    }

    /// Cria um cliente a partir de uma configuração explícita
    pub fn from_config(config: &WrikeConfig) -> Result<Self> {
        if config.api_token.trim().is_empty() {
            return Err(WrikeError::ConfigError("api_token vazio".to_string()));
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| WrikeError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_token: config.api_token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth_header(&self) -> String {
        format!("bearer {}", self.api_token)
    }

    /// Executa uma requisição GET
    pub(crate) async fn get(&self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Content-Type", "application/json")
            .header("cache-control", "no-cache")
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Executa uma requisição GET e parseia o JSON completo
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.get(endpoint).await?;
        let json = response.json().await?;
        Ok(json)
    }

    /// Executa uma requisição GET e retorna apenas o conteúdo de `data`
    pub(crate) async fn get_data<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let envelope: DataEnvelope<T> = self.get_json(endpoint).await?;
        Ok(envelope.data)
    }

    /// Executa uma requisição POST e retorna apenas o conteúdo de `data`
    pub(crate) async fn post_data<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("POST {} with body: {}", url, serde_json::to_string(body).unwrap_or_default());

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await?;

        let envelope: DataEnvelope<T> = self.handle_response(response).await?.json().await?;
        Ok(envelope.data)
    }

    /// Executa uma requisição PUT e retorna apenas o conteúdo de `data`
    pub(crate) async fn put_data<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("PUT {}", url);

        let response = self
            .http_client
            .put(&url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await?;

        let envelope: DataEnvelope<T> = self.handle_response(response).await?.json().await?;
        Ok(envelope.data)
    }

    /// Executa uma requisição DELETE e retorna apenas o conteúdo de `data`
    pub(crate) async fn delete_data<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("DELETE {}", url);

        let response = self
            .http_client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let envelope: DataEnvelope<T> = self.handle_response(response).await?.json().await?;
        Ok(envelope.data)
    }

    /// Processa a resposta HTTP e trata erros
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let status_code = status.as_u16();
            let error_body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("Wrike API error ({}): {}", status_code, error_body);

            // O Wrike responde {"errorDescription": "...", "error": "not_authorized"}
            let message = if let Ok(json) = serde_json::from_str::<Value>(&error_body) {
                json.get("errorDescription")
                    .or_else(|| json.get("error"))
                    .or_else(|| json.get("message"))
                    .and_then(|v| v.as_str())
                    .unwrap_or(&error_body)
                    .to_string()
            } else {
                error_body
            };

            Err(WrikeError::ApiError {
                status: status_code,
                message,
            })
        }
    }

    /// Obtém o token de autenticação
    pub fn token(&self) -> &str {
        &self.api_token
    }

    /// Obtém a URL base
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
