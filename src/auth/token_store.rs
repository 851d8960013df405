//! Token Store
//!
//! Armazenamento explícito do access token em memória. Substitui o estado
//! global mutável do protótipo original por um objeto compartilhado via Arc.
//!
//! Invariante: nenhum expiry é rastreado. Uma vez gravado, o token é
//! reutilizado indefinidamente até que uma nova troca (code ou refresh)
//! o sobrescreva. Token revogado no provedor só falha lá na frente, na
//! chamada à API de planilha — refresh é sempre manual.

use tokio::sync::RwLock;

/// Origem do token corrente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Troca única de authorization code
    CodeExchange,
    /// Troca repetível de refresh token
    RefreshExchange,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::CodeExchange => "authorization_code",
            TokenSource::RefreshExchange => "refresh_token",
        }
    }
}

/// Bearer token opaco retornado pelo provedor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub source: TokenSource,
}

impl AccessToken {
    pub fn new(value: String, source: TokenSource) -> Self {
        Self { value, source }
    }

    /// Valor do header Authorization no formato bearer do Zoho
    pub fn authorization_header(&self) -> String {
        format!("Zoho-oauthtoken {}", self.value)
    }
}

/// Guarda o único token do processo
///
/// Dois estados: vazio (não autenticado) e preenchido (autenticado).
/// Transições só acontecem via trocas explícitas; escritas concorrentes
/// seguem last-write-wins, ambos os chamadores recebem tokens válidos.
#[derive(Debug, Default)]
pub struct TokenStore {
    inner: RwLock<Option<AccessToken>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sobrescreve o token corrente (troca bem-sucedida)
    pub async fn set(&self, token: AccessToken) {
        *self.inner.write().await = Some(token);
    }

    /// Retorna o token em cache, se houver
    pub async fn current(&self) -> Option<AccessToken> {
        self.inner.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
