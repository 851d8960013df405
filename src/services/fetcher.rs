//! Sheet Fetcher
//!
//! Busca linhas da planilha segundo a estratégia escolhida no startup:
//! scrape da página publicada (sem auth) ou API REST de worksheet records
//! (com bearer token do TokenStore).

use reqwest::Client;
use serde_json::{json, Value};

use crate::auth::TokenStore;
use crate::config::{FetchStrategy, ZohoSettings};
use crate::services::extract::extract_sheet_data;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct SheetFetcher {
    strategy: FetchStrategy,
    settings: ZohoSettings,
    http_client: Client,
}

impl SheetFetcher {
    pub fn new(settings: ZohoSettings, strategy: FetchStrategy) -> Self {
        Self {
            strategy,
            settings,
            http_client: Client::new(),
        }
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    /// Executa a estratégia configurada. Nenhum retry: falha upstream é
    /// devolvida imediatamente ao chamador.
    pub async fn fetch(&self, token_store: &TokenStore) -> AppResult<Value> {
        match self.strategy {
            FetchStrategy::PublicScrape => self.fetch_published_page().await,
            FetchStrategy::AuthenticatedApi => self.fetch_worksheet_records(token_store).await,
        }
    }

    /// Estratégia scrape: GET na página publicada + extração heurística
    async fn fetch_published_page(&self) -> AppResult<Value> {
        let url = &self.settings.published_url;
        if url.is_empty() {
            return Err(AppError::ConfigError(
                "ZOHO_PUBLISHED_URL não configurado para a estratégia scrape".to_string(),
            ));
        }

        log_info(&format!("🔍 [Fetcher] Buscando página publicada: {}", url));

        let response = self.http_client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log_zoho_api_error(url, Some(status.as_u16()), &body);
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let html = response.text().await?;
        let extracted = extract_sheet_data(&html)?;

        log_info("✅ [Fetcher] Extração concluída");

        // Mesmo envelope de resposta do serviço original
        Ok(json!({ "extractedData": extracted }))
    }

    /// Estratégia api: POST no endpoint de worksheet records com o token
    /// em cache. O payload do provedor é repassado sem modificação.
    async fn fetch_worksheet_records(&self, token_store: &TokenStore) -> AppResult<Value> {
        let token = token_store
            .current()
            .await
            .ok_or(AppError::NotAuthenticated)?;

        let url = format!(
            "{}/{}",
            self.settings.api_base_url.trim_end_matches('/'),
            self.settings.sheet_id
        );

        log_info(&format!(
            "📡 [Fetcher] POST {} (worksheet: {})",
            url, self.settings.worksheet_name
        ));

        let mut params = vec![("method", "worksheet.records.fetch".to_string())];
        match &self.settings.worksheet_id {
            Some(id) => params.push(("worksheet_id", id.clone())),
            None => params.push(("worksheet_name", self.settings.worksheet_name.clone())),
        }

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", token.authorization_header())
            .form(&params)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log_zoho_api_error(&url, Some(status.as_u16()), &body);
            // Sem invalidação automática do token em 401: refresh é manual
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let records: Value = response.json().await?;

        log_info("✅ [Fetcher] Records recebidos do Zoho Sheet");

        Ok(records)
    }
}
