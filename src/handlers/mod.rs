pub mod fetch;
pub mod health;

pub use fetch::*;
pub use health::*;

// Handlers OAuth2 estão em src/auth/handlers.rs (módulo separado)
