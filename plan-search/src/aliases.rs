//! Organization name aliases for fuzzy identity matching.
//!
//! Search results rarely spell an organization's full name. A district
//! called "Maywood School District 89" shows up as "Maywood 89",
//! "SD 89", "Dist. 89" or "M89", so every one of those is kept as a
//! lowercase alias and matched as a plain substring.

use std::collections::BTreeSet;

use crate::error::{DiscoveryError, Result};

/// Words removed to produce the short form of a name.
const STOPWORDS: &[&str] = &[
    "school",
    "public",
    "unified",
    "community",
    "consolidated",
    "elementary",
    "high",
    "unit",
    "district",
    // District-number abbreviations.
    "sd",
    "usd",
    "isd",
    "cusd",
    "cisd",
    "chsd",
    "esd",
    "hsd",
    "dist",
    "no",
];

/// Prefixes combined with every numeric token in the name.
const NUMBER_PREFIXES: &[&str] = &["sd", "district", "d", "dist"];

/// Derive the alias set for an organization name.
///
/// The set always contains the full lowercased name. Generation is pure:
/// the same name always yields the same set.
///
/// # Errors
///
/// Returns [`DiscoveryError::Configuration`] when the name is blank, which
/// is the only way the alias set can come out empty.
pub fn generate_aliases(name: &str) -> Result<BTreeSet<String>> {
    let base = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let mut aliases = BTreeSet::new();
    if !base.is_empty() {
        aliases.insert(base.clone());
    }

    let short = short_form(&base);
    if !short.is_empty() {
        aliases.insert(short.clone());
    }

    let numbers = numeric_tokens(&base);
    for number in &numbers {
        aliases.insert(number.clone());
        for prefix in NUMBER_PREFIXES {
            aliases.insert(format!("{prefix} {number}"));
        }
    }

    let acronym = acronym(&short);
    if !acronym.is_empty() {
        if numbers.is_empty() {
            if acronym.len() >= 2 {
                aliases.insert(acronym);
            }
        } else {
            for number in &numbers {
                aliases.insert(format!("{acronym}{number}"));
            }
        }
    }

    if aliases.is_empty() {
        return Err(DiscoveryError::Configuration(format!(
            "no aliases could be derived from organization name {name:?}"
        )));
    }
    tracing::debug!(count = aliases.len(), "aliases generated");
    Ok(aliases)
}

/// The name with stopwords and punctuation removed.
fn short_form(base: &str) -> String {
    base.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty() && !STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every 1–4 digit token, in order of first appearance.
fn numeric_tokens(base: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let tokens = base
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| (1..=4).contains(&word.len()) && word.chars().all(|c| c.is_ascii_digit()));
    for token in tokens {
        if !seen.iter().any(|s| s == token) {
            seen.push(token.to_string());
        }
    }
    seen
}

/// First letters of the purely alphabetic words of the short form.
fn acronym(short: &str) -> String {
    short
        .split_whitespace()
        .filter(|word| word.chars().all(char::is_alphabetic))
        .filter_map(|word| word.chars().next())
        .collect()
}
