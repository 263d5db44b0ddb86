use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[a-z0-9]+").unwrap();
}

/// Lower-cased alphanumeric words longer than three characters.
pub fn content_words(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.len() > 3)
        .map(str::to_string)
        .collect()
}

/// First fingerprint sharing two content words with `text`, or one when the
/// fingerprint itself has at most three.
pub fn matching_fingerprint<'a>(text: &str, fingerprints: &'a [String]) -> Option<&'a str> {
    let words = content_words(text);
    fingerprints
        .iter()
        .find(|fp| {
            let fp_words = content_words(fp);
            let shared = fp_words.intersection(&words).count();
            shared >= 2 || (fp_words.len() <= 3 && shared >= 1)
        })
        .map(String::as_str)
}

/// Appends ` [known pattern: <fingerprint>]` when a fingerprint matches
/// `observed`. The description itself is never matched.
pub fn enrich_description(
    description: String,
    observed: &str,
    fingerprints: &[String],
) -> String {
    match matching_fingerprint(observed, fingerprints) {
        Some(fp) => format!("{} [known pattern: {}]", description, fp),
        None => description,
    }
}
