//! Name sanitization for synthesized models and their fields.
//!
//! Table names become model names (`order_items` -> `OrderItems`); column names become field
//! names that are always valid, non-reserved and unique within their model.

use std::collections::HashSet;

/// Separator reserved for path-style addressing (`customer__name`); never allowed in a field name.
pub const LOOKUP_SEP: &str = "__";

/// Model name used when a table name has no usable character.
const FALLBACK_MODEL_NAME: &str = "Table";

/// Field name used when a column name normalizes to nothing.
const FALLBACK_FIELD_NAME: &str = "field";

/// Reserved words (strict and reserved keywords); sorted for binary search.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// A column name after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    /// The resolved field name.
    pub name: String,
    /// Every deviation from the raw name, in the order it was applied.
    pub notes: Vec<String>,
    /// The raw column name, kept when the field name cannot be mapped back to it implicitly.
    pub db_column: Option<String>,
}

/// Turns a table name into a model name: title-case every word, drop everything that is not
/// an ASCII letter or digit.
pub fn normalize_table(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for ch in raw.chars() {
        let is_letter = ch.is_alphabetic();
        if is_letter && !prev_is_letter {
            name.extend(ch.to_uppercase().filter(char::is_ascii_alphanumeric));
        } else if is_letter {
            name.extend(ch.to_lowercase().filter(char::is_ascii_alphanumeric));
        } else if ch.is_ascii_digit() {
            name.push(ch);
        }
        prev_is_letter = is_letter;
    }

    if name.is_empty() {
        FALLBACK_MODEL_NAME.to_string()
    } else {
        name
    }
}

/// Turns a column name into a field name unique among `used_names`, then records it there.
///
/// Relation columns lose their `_id` suffix; when there is none, the raw column is kept as
/// explicit source column.
pub fn normalize_column(
    raw: &str,
    used_names: &mut HashSet<String>,
    is_relation: bool,
) -> NormalizedName {
    let mut notes = Vec::new();
    let mut db_column = None;

    let mut name = raw.to_lowercase();
    if name != raw {
        notes.push("Field name made lowercase.".to_string());
    }

    if is_relation {
        match name.strip_suffix("_id") {
            Some(stripped) => name = stripped.to_string(),
            None => db_column = Some(raw.to_string()),
        }
    }

    let (replaced, replacements) = replace_non_word_runs(&name);
    name = replaced;
    if replacements > 0 {
        notes.push("Field renamed to remove unsuitable characters.".to_string());
    }

    if name.contains(LOOKUP_SEP) {
        while name.contains(LOOKUP_SEP) {
            name = name.replace(LOOKUP_SEP, "_");
        }
        if raw.to_lowercase().contains(LOOKUP_SEP) {
            notes.push("Field renamed because it contained more than one '_' in a row.".to_string());
        }
    }

    if name.is_empty() {
        name = FALLBACK_FIELD_NAME.to_string();
        notes.push("Field renamed because it was empty.".to_string());
    }

    if name.starts_with('_') {
        name = format!("field{name}");
        notes.push("Field renamed because it started with '_'.".to_string());
    }

    if name.ends_with('_') {
        name = format!("{name}field");
        notes.push("Field renamed because it ended with '_'.".to_string());
    }

    if is_reserved(&name) {
        name.push_str("_field");
        notes.push("Field renamed because it was a reserved word.".to_string());
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name = format!("number_{name}");
        notes.push("Field renamed because it wasn't a valid identifier.".to_string());
    }

    if used_names.contains(&name) {
        let mut num = 0usize;
        while used_names.contains(&format!("{name}_{num}")) {
            num += 1;
        }
        name = format!("{name}_{num}");
        notes.push("Field renamed because of name conflict.".to_string());
    }

    if name != raw && !notes.is_empty() {
        db_column = Some(raw.to_string());
    }

    used_names.insert(name.clone());

    NormalizedName {
        name,
        notes,
        db_column,
    }
}

/// Returns whether `name` is a reserved word.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.binary_search(&name).is_ok()
}

/// Returns whether `name` is a valid field name: ASCII, starting with a letter, made of
/// letters, digits and single underscores, and not reserved.
pub fn is_valid_field_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.contains(LOOKUP_SEP)
        && !is_reserved(name)
}

/// Replaces every run of non-word characters with a single `_`.
fn replace_non_word_runs(name: &str) -> (String, usize) {
    let mut out = String::with_capacity(name.len());
    let mut runs = 0;
    let mut in_run = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            runs += 1;
            in_run = true;
        }
    }
    (out, runs)
}
