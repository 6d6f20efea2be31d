// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Inline parameter declarations
//!
//! The backend needs parameter types before it compiles a query, so each
//! parameter is declared at the top of the query text:
//!
//! ```text
//! DECLARE $p1 AS Int64;
//! SELECT * FROM t WHERE id = $p1
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::params::QueryParameters;

static DECLARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bDECLARE\s+(\$[A-Za-z_][A-Za-z0-9_]*)\s+AS\b")
        .expect("declare pattern is valid")
});

/// Blank out comments and quoted literals so only statement text remains
fn strip_comments_and_literals(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut chars = query.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            '\'' | '"' | '`' => {
                let quote = c;
                let mut escaped = false;
                for c in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == quote {
                        break;
                    }
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Names declared by statements of the query, ignoring comments and literals
fn declared_names(query: &str) -> HashSet<String> {
    let statements = strip_comments_and_literals(query);
    DECLARE_RE
        .captures_iter(&statements)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Prepend a sorted `DECLARE` line for every parameter the query does not
/// declare itself. Without parameters the query is returned unchanged.
pub fn query_with_declares(query: &str, params: &QueryParameters) -> String {
    if params.is_empty() {
        return query.to_string();
    }

    let already = declared_names(query);
    let mut declares: Vec<String> = params
        .iter()
        .filter(|(name, _)| !already.contains(*name))
        .map(|(name, value)| format!("DECLARE {} AS {};", name, value.value_type()))
        .collect();

    if declares.is_empty() {
        return query.to_string();
    }
    declares.sort();

    let mut out = declares.join("\n");
    out.push('\n');
    out.push_str(query);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{to_query_params, NamedValue};
    use crate::value::{Type, Value};

    #[test]
    fn test_single_declare() {
        let params = to_query_params(&[NamedValue::named("p1", 42i64)]).unwrap();
        let query = query_with_declares("SELECT * FROM t WHERE id = $p1", &params);
        assert_eq!(
            query,
            "DECLARE $p1 AS Int64;\nSELECT * FROM t WHERE id = $p1"
        );
    }

    #[test]
    fn test_declares_sorted() {
        let params = to_query_params(&[
            NamedValue::named("b", "x"),
            NamedValue::named("a", Value::Null(Type::Uint64)),
        ])
        .unwrap();
        let query = query_with_declares("SELECT $a, $b", &params);
        assert!(query.starts_with(
            "DECLARE $a AS Optional<Uint64>;\nDECLARE $b AS Utf8;\n"
        ));
    }

    #[test]
    fn test_existing_declare_kept() {
        let params = to_query_params(&[
            NamedValue::named("p1", 1i64),
            NamedValue::named("p2", true),
        ])
        .unwrap();
        let text = "declare $p1 as Int64;\nSELECT $p1, $p2";
        let query = query_with_declares(text, &params);
        assert_eq!(query, format!("DECLARE $p2 AS Bool;\n{}", text));
    }

    #[test]
    fn test_commented_declare_ignored() {
        let params = to_query_params(&[NamedValue::named("p1", 1i64)]).unwrap();
        let text = "-- old: DECLARE $p1 AS Utf8;\nSELECT $p1";
        let query = query_with_declares(text, &params);
        assert_eq!(query, format!("DECLARE $p1 AS Int64;\n{}", text));

        let text = "/* DECLARE $p1 AS Utf8; */ SELECT $p1";
        let query = query_with_declares(text, &params);
        assert!(query.starts_with("DECLARE $p1 AS Int64;\n"));
    }

    #[test]
    fn test_declare_in_literal_ignored() {
        let params = to_query_params(&[NamedValue::named("p1", 1i64)]).unwrap();
        let text = "SELECT 'DECLARE $p1 AS Utf8;' AS note, $p1";
        let query = query_with_declares(text, &params);
        assert_eq!(query, format!("DECLARE $p1 AS Int64;\n{}", text));
    }

    #[test]
    fn test_strip_keeps_statements() {
        let stripped = strip_comments_and_literals(
            "DECLARE $a AS Int64; -- note\nSELECT 'it\\'s', \"x\" /* c */ FROM t",
        );
        assert!(stripped.contains("DECLARE $a AS Int64;"));
        assert!(stripped.contains("SELECT"));
        assert!(stripped.contains("FROM t"));
        assert!(!stripped.contains("note"));
        assert!(!stripped.contains("it"));
        assert!(!stripped.contains('c'));
    }

    #[test]
    fn test_no_params_unchanged() {
        let query = query_with_declares("SELECT 1", &QueryParameters::new());
        assert_eq!(query, "SELECT 1");
    }
}
