//! Identifier and SQL name conventions

use crate::error::{ArchError, ArchResult};
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII letters, digits and underscore only
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid regex"));

pub fn is_valid_sql_name(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub fn validate_sql_name(name: &str) -> ArchResult<&str> {
    if is_valid_sql_name(name) {
        Ok(name)
    } else {
        Err(ArchError::InvalidSqlName { name: name.to_string() })
    }
}

pub fn validate_identifier(name: &str) -> ArchResult<&str> {
    if is_valid_identifier(name) {
        Ok(name)
    } else {
        Err(ArchError::InvalidIdentifier { name: name.to_string() })
    }
}

/// `userId` -> `user_id`, `HTTPServer` -> `http_server`, `user_id` stays.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `a` + `b` -> `a_b`.
pub fn concat_sql_names(prefix: &str, name: &str) -> String {
    format!("{prefix}_{name}")
}

/// The conventional primary key name for a model: `User` -> `user_id`.
pub fn id_field_name(model_simple_name: &str) -> String {
    format!("{}_id", to_snake_case(model_simple_name))
}

/// The part of a path after the last `::`.
pub fn simple_name(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
