pub mod settings;

pub use settings::{FetchStrategy, ServerSettings, Settings, ZohoSettings};
