use serde::Serialize;
use serde_json::Value;

/// Uma linha da planilha no caminho de scrape: textos de célula em ordem de documento
pub type SheetRow = Vec<String>;

/// Resultado da extração de dados de uma página publicada do Zoho Sheet
///
/// Ou a tabela HTML rendeu linhas, ou o literal `RangeGridData` embutido em
/// script foi recuperado como JSON. Os dois formatos não têm schema comum;
/// consumidores precisam tolerar as duas formas.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ExtractionResult {
    /// Linhas extraídas de `<table><tbody><tr><td>`, trimadas, row-major
    Rows(Vec<SheetRow>),
    /// Valor JSON recuperado do literal `RangeGridData = {...};`
    Grid(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_serialize_as_plain_array() {
        let result = ExtractionResult::Rows(vec![vec!["a".to_string(), "b".to_string()]]);
        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized, json!([["a", "b"]]));
    }

    #[test]
    fn test_grid_serializes_transparently() {
        let result = ExtractionResult::Grid(json!({"a": 1}));
        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized, json!({"a": 1}));
    }
}
