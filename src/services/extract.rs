//! Extração de dados tabulares da página publicada do Zoho Sheet
//!
//! Heurística em dois estágios, assumida frágil por construção:
//! 1. Células de `<table><tbody><tr><td>` em ordem de documento, trimadas.
//! 2. Fallback: literal `RangeGridData = {...};` embutido em `<script>`,
//!    normalizado para JSON por um tokenizer dedicado (comentários e chaves
//!    bare) e parseado com serde_json.
//!
//! Qualquer mudança de markup no provedor quebra o estágio 1 em silêncio;
//! sintaxe fora do subconjunto suportado quebra o estágio 2 com erro preciso.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::models::{ExtractionResult, SheetRow};
use crate::utils::{AppError, AppResult};

/// Atribuição do objeto de grid embutido pelo renderer do Zoho
static GRID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)RangeGridData\s*=\s*(\{.*?\});").expect("regex de RangeGridData inválida")
});

/// Extrai dados da página publicada: tabela primeiro, grid como fallback
pub fn extract_sheet_data(html: &str) -> AppResult<ExtractionResult> {
    let document = Html::parse_document(html);

    let rows = extract_table_rows(&document)?;
    if !rows.is_empty() {
        return Ok(ExtractionResult::Rows(rows));
    }

    let script_content = inline_script_content(&document)?;
    let literal = GRID_RE
        .captures(&script_content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AppError::Extraction("no table or grid data found".to_string()))?;

    let value = normalize_grid_literal(&literal)?;
    Ok(ExtractionResult::Grid(value))
}

/// Estágio 1: uma SheetRow por `<tr>`, uma célula por `<td>` (texto trimado)
fn extract_table_rows(document: &Html) -> AppResult<Vec<SheetRow>> {
    let row_selector = selector("table tbody tr")?;
    let cell_selector = selector("td")?;

    let mut rows = Vec::new();
    for row in document.select(&row_selector) {
        let cells: SheetRow = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        rows.push(cells);
    }

    Ok(rows)
}

/// Conteúdo concatenado de todos os `<script>` inline
fn inline_script_content(document: &Html) -> AppResult<String> {
    let script_selector = selector("script")?;

    let mut content = String::new();
    for script in document.select(&script_selector) {
        for text in script.text() {
            content.push_str(text);
        }
        content.push('\n');
    }

    Ok(content)
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css)
        .map_err(|e| AppError::InternalError(format!("Seletor CSS inválido '{}': {:?}", css, e)))
}

/// Estágio 2: normaliza o literal JS para JSON e parseia
///
/// Subconjunto de gramática suportado: objetos, arrays, strings com aspas
/// simples ou duplas (com escapes), números, true/false/null, comentários
/// `/* */` e `//`, e chaves identificador sem aspas.
pub fn normalize_grid_literal(literal: &str) -> AppResult<Value> {
    let stripped = strip_comments(literal);
    let normalized = quote_bare_keys(&stripped);

    serde_json::from_str(&normalized)
        .map_err(|e| AppError::Extraction(format!("failed to parse grid literal: {}", e)))
}

/// Remove comentários `/* */` e `//`, preservando o conteúdo de strings
///
/// A operação é idempotente: o texto sem comentários passa inalterado.
pub fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Conteúdo de string é preservado; "//" dentro de string não é comentário
        if c == '"' || c == '\'' {
            let end = copy_string_literal(&chars, i, &mut out);
            i = end;
            continue;
        }

        if c == '/' && i + 1 < chars.len() {
            match chars[i + 1] {
                '*' => {
                    // Comentário de bloco: pular até "*/" (ou fim da entrada)
                    i += 2;
                    while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                        i += 1;
                    }
                    i = (i + 2).min(chars.len());
                    continue;
                }
                '/' => {
                    // Comentário de linha: pular até a quebra, mantendo-a
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                    continue;
                }
                _ => {}
            }
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Reescreve chaves identificador (`key:`) como chaves JSON (`"key":`) e
/// converte strings com aspas simples para aspas duplas
pub fn quote_bare_keys(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + 16);
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '"' || c == '\'' {
            let end = copy_string_literal(&chars, i, &mut out);
            i = end;
            continue;
        }

        if is_ident_char(c) {
            let start = i;
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();

            // Lookahead: identificador seguido de ':' é chave de objeto
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == ':' {
                out.push('"');
                out.push_str(&ident);
                out.push('"');
            } else {
                out.push_str(&ident);
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Copia um literal de string a partir de `start` (posição da aspa de
/// abertura), emitindo sempre com aspas duplas. Retorna o índice após a
/// aspa de fechamento.
fn copy_string_literal(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    out.push('"');

    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && i + 1 < chars.len() {
            let next = chars[i + 1];
            if quote == '\'' && next == '\'' {
                // \' só é escape necessário dentro de aspas simples
                out.push('\'');
            } else {
                out.push('\\');
                out.push(next);
            }
            i += 2;
            continue;
        }

        if c == quote {
            out.push('"');
            return i + 1;
        }

        if c == '"' && quote == '\'' {
            // Aspa dupla literal dentro de string de aspas simples
            out.push('\\');
            out.push('"');
            i += 1;
            continue;
        }

        out.push(c);
        i += 1;
    }

    // String não terminada: devolve o que houver; o parse JSON reportará
    chars.len()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
