// src/utils.rs

/// Check if a string is a syntactically valid domain name
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        if !part.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }

        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }
    }

    true
}

/// Canonical form used for candidate deduplication: trimmed, lowercase, no
/// trailing root dot. Returns `None` for names that end up empty.
pub fn normalize_domain(domain: &str) -> Option<String> {
    let cleaned = domain.trim().trim_end_matches('.').to_lowercase();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Top-level label of a domain, lowercased.
pub fn tld_of(domain: &str) -> Option<String> {
    domain
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .filter(|label| !label.is_empty())
        .map(|label| label.to_lowercase())
}
