// src/services/filename.rs
// DOCUMENTATION: Filename metadata extraction
// PURPOSE: Derive the numeric photo id and a display title from object keys

use regex::Regex;
use std::sync::LazyLock;

static EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[^/.]+$").unwrap());
static TRAILING_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(\d+)_o$").unwrap());
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static ID_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_\d+_o$").unwrap());

/// Extract the numeric photo id from an object key.
///
/// Expected shape: `"andrea-cano-montull_54701383010_o.jpg"` where the digits
/// before the trailing `_o` are the provider-assigned id. Falls back to the
/// final run of digits anywhere in the stem; returns None when the name
/// carries no digits at all.
pub fn extract_photo_id(filename: &str) -> Option<i64> {
    let stem = EXTENSION.replace(filename, "");

    if let Some(captures) = TRAILING_ID.captures(&stem) {
        if let Ok(id) = captures[1].parse::<i64>() {
            return Some(id);
        }
    }

    DIGIT_RUN
        .find_iter(&stem)
        .last()
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Derive a human title from an object key.
///
/// `"name-with-dashes_54701383010_o.jpg"` becomes `"Name With Dashes"`.
/// Falls back to the raw filename when stripping leaves nothing.
pub fn extract_title(filename: &str) -> String {
    let stem = EXTENSION.replace(filename, "");
    let stem = ID_SUFFIX.replace(&stem, "");

    let title = stem
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        filename.to_string()
    } else {
        title
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
