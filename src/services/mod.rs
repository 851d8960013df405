pub mod extract;
pub mod fetcher;

pub use extract::{extract_sheet_data, normalize_grid_literal, quote_bare_keys, strip_comments};
pub use fetcher::SheetFetcher;
