//! Canonical cache-key construction.
//!
//! Keys are `<domain>:<id>` plus normalized filter segments. Filters are
//! sorted by name and lowercased/trimmed before joining, so two
//! logically-identical queries always share one key regardless of the
//! literal form their parameters arrived in.

/// Key for an unfiltered entity lookup, e.g. `team:<id>:all`.
pub fn entity_key(domain: &str, id: &str) -> String {
    format!("{domain}:{id}:all")
}

/// Prefix covering every filter variant of one entity, e.g. `league:<id>:`.
pub fn entity_prefix(domain: &str, id: &str) -> String {
    format!("{domain}:{id}:")
}

/// Key for a filtered lookup. Filters with empty values are dropped;
/// the rest are normalized and sorted by name. No filters degenerates
/// to [`entity_key`].
pub fn filtered_key(domain: &str, id: &str, filters: &[(&str, String)]) -> String {
    let mut parts: Vec<String> = filters
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(name, value)| {
            format!(
                "{}={}",
                name.trim().to_ascii_lowercase(),
                value.trim().to_ascii_lowercase()
            )
        })
        .collect();

    if parts.is_empty() {
        return entity_key(domain, id);
    }

    parts.sort();
    format!("{domain}:{id}:{}", parts.join(":"))
}
