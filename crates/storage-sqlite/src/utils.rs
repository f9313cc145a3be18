//! Utility functions for SQLite storage operations.

use crate::errors::IntoCore;
use cybersentinel_core::Result;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite limits the number of bound parameters per statement (typically
/// 999), so `IN (...)` lists are split into chunks of this size.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk a slice into smaller slices for batch SQLite queries.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Encodes a list column. Lists are stored as JSON text.
pub fn encode_list(values: &[String]) -> Result<String> {
    serde_json::to_string(values).into_core()
}

/// Decodes a list column. Malformed text decodes to an empty list.
pub fn decode_list(text: &str) -> Vec<String> {
    serde_json::from_str(text).unwrap_or_default()
}

/// Escapes `%`, `_` and `\` for use inside a LIKE pattern with `ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_stay_under_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), SQLITE_MAX_PARAMS_CHUNK);
        assert_eq!(chunks[2].len(), 200);
        assert!(chunk_for_sqlite::<i32>(&[]).next().is_none());
    }

    #[test]
    fn list_columns() {
        let encoded = encode_list(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(encoded, r#"["a","b"]"#);
        assert_eq!(decode_list(&encoded), vec!["a", "b"]);
        assert!(decode_list("not json").is_empty());
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(like_pattern("api"), "%api%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
