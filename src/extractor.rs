// src/extractor.rs
use crate::types::IdentityField;
use regex::Regex;
use std::sync::LazyLock;

// Values stop at the end of the line so `\r\n` and `\n` records behave the same.
static ORGANIZATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Registrant\s+Organi[sz]ation:[ \t]*([^\r\n]*)").unwrap());
static OWNER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Registrant\s+Name:[ \t]*([^\r\n]*)").unwrap());
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Registrant\s+Email:[ \t]*([^\r\n]*)").unwrap());

fn pattern(field: IdentityField) -> &'static Regex {
    match field {
        IdentityField::Organization => &*ORGANIZATION,
        IdentityField::OwnerName => &*OWNER_NAME,
        IdentityField::Email => &*EMAIL,
    }
}

/// Extract the first value of `field` from a raw WHOIS record.
///
/// Only the first occurrence is considered. Records with several registrant
/// blocks (privacy proxies, registry + registrar text) yield the earliest one.
/// A field line with a blank value counts as absent.
pub fn extract_field(text: &str, field: IdentityField) -> Option<&str> {
    let value = pattern(field).captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// All three identity fields of a record, in selector order.
pub fn extract_all(text: &str) -> Vec<(IdentityField, Option<&str>)> {
    IdentityField::ALL
        .iter()
        .map(|&field| (field, extract_field(text, field)))
        .collect()
}
