//! OAuth2 Configuration
//!
//! Centraliza todas as configurações necessárias para OAuth2 do Zoho

use serde::{Deserialize, Serialize};

use crate::config::ZohoSettings;

/// Escopo mínimo para ler worksheet records
const OAUTH_SCOPE: &str = "ZohoSheet.dataAPI.READ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// Client ID fornecido pelo Zoho API Console
    pub client_id: String,

    /// Client Secret fornecido pelo Zoho API Console
    pub client_secret: String,

    /// URL de callback registrada no Zoho API Console
    pub redirect_uri: String,

    /// Base dos endpoints de OAuth (accounts.zoho.com, .eu, .com.au, ...)
    pub accounts_base_url: String,

    /// Authorization code de uso único (endpoint /get-token)
    pub auth_code: Option<String>,

    /// Refresh token de longa duração (endpoint /refresh-token)
    pub refresh_token: Option<String>,
}

impl OAuth2Config {
    /// Monta a configuração a partir das settings carregadas no startup
    ///
    /// Retorna `Err` quando as credenciais obrigatórias não estão presentes;
    /// nesse caso os endpoints OAuth2 ficam desabilitados (deploy scrape-only).
    pub fn from_settings(zoho: &ZohoSettings) -> Result<Self, String> {
        let client_id = zoho
            .client_id
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "ZOHO_CLIENT_ID não configurado".to_string())?;

        let client_secret = zoho
            .client_secret
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "ZOHO_CLIENT_SECRET não configurado".to_string())?;

        let redirect_uri = zoho
            .redirect_uri
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "ZOHO_REDIRECT_URI não configurado".to_string())?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            accounts_base_url: zoho.accounts_base_url.clone(),
            auth_code: zoho.auth_code.clone().filter(|v| !v.is_empty()),
            refresh_token: zoho.refresh_token.clone().filter(|v| !v.is_empty()),
        })
    }

    /// Gerar URL da tela de consentimento do Zoho
    pub fn authorization_url(&self) -> String {
        format!(
            "{}/oauth/v2/auth?response_type=code&client_id={}&scope={}&access_type=offline&redirect_uri={}",
            self.accounts_base_url,
            self.client_id,
            OAUTH_SCOPE,
            urlencoding::encode(&self.redirect_uri)
        )
    }

    /// Endpoint de troca de tokens
    pub fn token_url(&self) -> String {
        format!("{}/oauth/v2/token", self.accounts_base_url)
    }
}
