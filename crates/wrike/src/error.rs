//! Tipos de erro para o crate wrike

use thiserror::Error;

/// Erros do cliente Wrike
#[derive(Debug, Error)]
pub enum WrikeError {
    /// Erro de requisição HTTP
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Erro da API do Wrike (status code não-2xx)
    #[error("Wrike API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Recurso não encontrado (folder, project, task, etc)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erro de configuração
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Erro de validação
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Nenhum dos seletores mutuamente exclusivos foi informado
    #[error("Missing required selector: {0}")]
    MissingSelector(String),

    /// Ciclo encontrado em `childIds` durante o cálculo de níveis
    #[error("Cycle detected in folder hierarchy at node {id}")]
    CycleDetected { id: String },

    /// Falha na leitura paginada do audit log
    #[error("Audit log fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Classificação das falhas de leitura de uma página do audit log
///
/// Todas são terminais para a agregação em curso (sem retry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 401/403: token inválido ou sem o direito "Create user activity reports"
    #[error("unauthorized (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// 400: token de página inválido ou filtro malformado
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Qualquer outro status, falha de transporte ou corpo ilegível
    #[error("unexpected failure (status {status:?}): {message}")]
    Unexpected { status: Option<u16>, message: String },
}

impl FetchError {
    /// Nome curto da classe, usado nos logs
    pub fn class(&self) -> &'static str {
        match self {
            FetchError::Unauthorized { .. } => "unauthorized",
            FetchError::BadRequest { .. } => "bad_request",
            FetchError::Unexpected { .. } => "unexpected",
        }
    }
}

impl From<WrikeError> for FetchError {
    fn from(err: WrikeError) -> Self {
        match err {
            WrikeError::ApiError { status, message } if status == 401 || status == 403 => {
                FetchError::Unauthorized { status, message }
            }
            WrikeError::ApiError { status: 400, message } => FetchError::BadRequest { message },
            WrikeError::ApiError { status, message } => FetchError::Unexpected {
                status: Some(status),
                message,
            },
            WrikeError::HttpError(e) => FetchError::Unexpected {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            WrikeError::Fetch(inner) => inner,
            other => FetchError::Unexpected {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, WrikeError>;
