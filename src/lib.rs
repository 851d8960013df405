// Biblioteca do middleware Zoho Sheet
// Expõe módulos para uso em testes e no binário

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use auth::TokenStore;
use services::SheetFetcher;

// AppState é definido aqui para ser compartilhado entre handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub token_store: Arc<TokenStore>,
    pub fetcher: SheetFetcher,
}
