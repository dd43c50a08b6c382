//! Canonical project hashing.
//!
//! A project hash identifies the exact input of a render run:
//! ```text
//! project_hash = hex(BLAKE3(JCS(project_json)))
//! ```
//! where JCS is the JSON Canonicalization Scheme (RFC 8785).

use crate::error::SpecError;
use crate::project::SpriteProject;

/// Computes the canonical BLAKE3 hash of a project.
///
/// Returns a 64-character lowercase hexadecimal string.
pub fn canonical_project_hash(project: &SpriteProject) -> Result<String, SpecError> {
    let value = project.to_value()?;
    Ok(canonical_value_hash(&value))
}

/// Computes the canonical BLAKE3 hash of a JSON value.
pub fn canonical_value_hash(value: &serde_json::Value) -> String {
    let canonical = canonicalize_json(value);
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

/// Canonicalizes a JSON value: sorted object keys, no whitespace, minimal
/// number and string formatting.
pub fn canonicalize_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => format_jcs_number(n),
        serde_json::Value::String(s) => format_jcs_string(s),
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(canonicalize_json).collect();
            format!("[{}]", items.join(","))
        }
        serde_json::Value::Object(obj) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = obj.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            let pairs: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", format_jcs_string(k), canonicalize_json(v)))
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
    }
}

fn format_jcs_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_nan() || f.is_infinite() => "null".to_string(),
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => {
            let s = format!("{}", f);
            if s.contains('.') && !s.contains('e') && !s.contains('E') {
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                s
            }
        }
        None => "null".to_string(),
    }
}

fn format_jcs_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c < '\x20' => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AnimationSpec, CharacterEntry};

    #[test]
    fn test_canonical_key_order() {
        let a: serde_json::Value = serde_json::from_str(r#"{"b": 1, "a": [1.5, "x"]}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"a": [1.5, "x"], "b": 1}"#).unwrap();
        assert_eq!(canonicalize_json(&a), r#"{"a":[1.5,"x"],"b":1}"#);
        assert_eq!(canonical_value_hash(&a), canonical_value_hash(&b));
    }

    #[test]
    fn test_project_hash_is_stable_and_sensitive() {
        let project = SpriteProject::new(vec![
            CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 16)),
        ]);
        let h1 = canonical_project_hash(&project).unwrap();
        let h2 = canonical_project_hash(&project.clone()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);

        let h3 = canonical_project_hash(&project.direction_count(4)).unwrap();
        assert_ne!(h1, h3);
    }
}
