use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub zoho: ZohoSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ZohoSettings {
    /// Estratégia de busca escolhida no startup: "scrape" ou "api"
    pub strategy: String,

    /// URL da página publicada (estratégia scrape)
    pub published_url: String,

    /// Identificador do sheet na API REST (estratégia api)
    pub sheet_id: String,
    pub worksheet_name: String,
    #[serde(default)]
    pub worksheet_id: Option<String>,

    pub accounts_base_url: String,
    pub api_base_url: String,

    // Credenciais OAuth2 (apenas estratégia api)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// Refresh token de longa duração para o endpoint /refresh-token
    pub refresh_token: Option<String>,
    /// Authorization code de uso único para o endpoint /get-token
    pub auth_code: Option<String>,
}

/// Estratégia de busca dos dados da planilha, resolvida uma única vez no startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Scraping da página HTML publicada (sem autenticação)
    PublicScrape,
    /// API REST de worksheet records com bearer token
    AuthenticatedApi,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente específicas do Zoho
        if let Ok(v) = std::env::var("ZOHO_FETCH_STRATEGY") {
            builder = builder.set_override("zoho.strategy", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_PUBLISHED_URL") {
            builder = builder.set_override("zoho.published_url", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_SHEET_ID") {
            builder = builder.set_override("zoho.sheet_id", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_WORKSHEET_NAME") {
            builder = builder.set_override("zoho.worksheet_name", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_WORKSHEET_ID") {
            builder = builder.set_override("zoho.worksheet_id", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_CLIENT_ID") {
            builder = builder.set_override("zoho.client_id", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_CLIENT_SECRET") {
            builder = builder.set_override("zoho.client_secret", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_REDIRECT_URI") {
            builder = builder.set_override("zoho.redirect_uri", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_REFRESH_TOKEN") {
            builder = builder.set_override("zoho.refresh_token", v)?;
        }
        if let Ok(v) = std::env::var("ZOHO_AUTH_CODE") {
            builder = builder.set_override("zoho.auth_code", v)?;
        }

        // Também suportar prefixo genérico (ex: ZOHO_SHEET__SERVER__PORT)
        builder = builder.add_source(Environment::with_prefix("ZOHO_SHEET").separator("__"));

        let s = builder.build()?;

        s.try_deserialize()
    }

    /// Resolve a estratégia configurada; valor desconhecido é erro de startup
    pub fn fetch_strategy(&self) -> Result<FetchStrategy, ConfigError> {
        match self.zoho.strategy.as_str() {
            "scrape" => Ok(FetchStrategy::PublicScrape),
            "api" => Ok(FetchStrategy::AuthenticatedApi),
            other => Err(ConfigError::Message(format!(
                "zoho.strategy inválida: '{}' (esperado 'scrape' ou 'api')",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings(strategy: &str) -> Settings {
        Settings {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            zoho: ZohoSettings {
                strategy: strategy.to_string(),
                published_url: "https://sheet.zohopublic.com/sheet/publishedrange/abc?type=grid"
                    .to_string(),
                sheet_id: "sheet123".to_string(),
                worksheet_name: "Sheet1".to_string(),
                worksheet_id: None,
                accounts_base_url: "https://accounts.zoho.com".to_string(),
                api_base_url: "https://sheet.zoho.com/api/v2".to_string(),
                client_id: None,
                client_secret: None,
                redirect_uri: None,
                refresh_token: None,
                auth_code: None,
            },
        }
    }

    #[test]
    fn test_fetch_strategy_scrape() {
        let settings = base_settings("scrape");
        assert_eq!(
            settings.fetch_strategy().unwrap(),
            FetchStrategy::PublicScrape
        );
    }

    #[test]
    fn test_fetch_strategy_api() {
        let settings = base_settings("api");
        assert_eq!(
            settings.fetch_strategy().unwrap(),
            FetchStrategy::AuthenticatedApi
        );
    }

    #[test]
    fn test_fetch_strategy_invalid() {
        let settings = base_settings("ftp");
        assert!(settings.fetch_strategy().is_err());
    }
}
