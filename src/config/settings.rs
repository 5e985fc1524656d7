use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File, FileFormat};
use wrike::WrikeConfig;

use crate::utils::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub wrike: WrikeSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WrikeSettings {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub max_pages: Option<u32>,  // None = até o fim do audit log
    #[serde(default = "default_separator")]
    pub flatten_separator: String,
}

fn default_base_url() -> String {
    wrike::config::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_page_size() -> u32 {
    100
}

fn default_separator() -> String {
    ".".to_string()
}

impl Default for WrikeSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: None,
            flatten_separator: default_separator(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente específicas
        if let Ok(token) = std::env::var("WRIKE_API_TOKEN") {
            builder = builder.set_override("wrike.token", token)?;
        }
        if let Ok(base_url) = std::env::var("WRIKE_BASE_URL") {
            builder = builder.set_override("wrike.base_url", base_url)?;
        }

        // WRIKE_EXPORT_EXPORT__MAX_PAGES=10 → export.max_pages
        builder = builder.add_source(
            Environment::with_prefix("WRIKE_EXPORT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Carrega a partir de um TOML em memória (sem ambiente)
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Falha cedo quando falta o token ou o tamanho de página é inválido
    pub fn validate(&self) -> Result<(), AppError> {
        if self.wrike.token.trim().is_empty() {
            return Err(AppError::ConfigError(
                "WRIKE_API_TOKEN não definido (use --token, variável de ambiente ou .env)".to_string(),
            ));
        }
        if self.export.page_size == 0 {
            return Err(AppError::ConfigError("export.page_size deve ser maior que zero".to_string()));
        }
        Ok(())
    }

    pub fn to_client_config(&self) -> WrikeConfig {
        WrikeConfig::new(self.wrike.token.clone())
            .with_base_url(self.wrike.base_url.clone())
            .with_timeouts(self.wrike.timeout_secs, self.wrike.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.wrike.base_url, "https://www.wrike.com/api/v4");
        assert_eq!(settings.wrike.timeout_secs, 30);
        assert_eq!(settings.export.page_size, 100);
        assert_eq!(settings.export.max_pages, None);
        assert_eq!(settings.export.flatten_separator, ".");
    }

    #[test]
    fn test_client_config_from_settings() {
        let settings = Settings::from_toml(
            r#"
            [wrike]
            token = "abc"
            base_url = "http://localhost:8080/api/v4/"
            timeout_secs = 10

            [export]
            max_pages = 3
            "#,
        )
        .unwrap();

        let config = settings.to_client_config();
        assert_eq!(config.api_token, "abc");
        assert_eq!(config.base_url, "http://localhost:8080/api/v4");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(settings.export.max_pages, Some(3));
    }

    #[test]
    fn test_validate_requires_token_and_page_size() {
        let missing_token = Settings::from_toml("").unwrap();
        assert!(matches!(missing_token.validate(), Err(AppError::ConfigError(_))));

        let zero_pages = Settings::from_toml("[wrike]\ntoken = \"abc\"\n[export]\npage_size = 0").unwrap();
        assert!(matches!(zero_pages.validate(), Err(AppError::ConfigError(_))));

        let ok = Settings::from_toml("[wrike]\ntoken = \"abc\"").unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_prefixed_env_overrides_export_section() {
        std::env::set_var("WRIKE_EXPORT_EXPORT__MAX_PAGES", "10");
        std::env::set_var("WRIKE_EXPORT_EXPORT__FLATTEN_SEPARATOR", "_");
        let settings = Settings::new();
        std::env::remove_var("WRIKE_EXPORT_EXPORT__MAX_PAGES");
        std::env::remove_var("WRIKE_EXPORT_EXPORT__FLATTEN_SEPARATOR");

        let settings = settings.unwrap();
        assert_eq!(settings.export.max_pages, Some(10));
        assert_eq!(settings.export.flatten_separator, "_");
    }
}
