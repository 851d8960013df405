/// Utilitários para manipulação segura de strings UTF-8

/// Trunca uma string de forma segura, sem cortar no meio de um caractere UTF-8
///
/// Usado para logar prefixos de tokens e codes sem expor o valor inteiro.
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;

    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    if end == 0 {
        return "";
    }

    &s[..end]
}
