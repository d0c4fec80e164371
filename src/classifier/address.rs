//! Candidate address extraction.

use std::collections::HashSet;

/// Extracts candidate chain addresses from post text.
///
/// Any whitespace-delimited run of 30 to 50 characters counts. The scan is
/// deliberately permissive (it does not validate the chain's address
/// encoding) and relies on the downstream token-metadata lookup to
/// discard false positives. Duplicates are dropped, first occurrence wins.
pub fn candidate_addresses(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for token in text.split_whitespace() {
        let length = token.chars().count();
        if (30..=50).contains(&length) && seen.insert(token) {
            candidates.push(token.to_string());
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_base58_sized_runs() {
        let text = "new listing EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v looks wild";
        assert_eq!(
            candidate_addresses(text),
            vec!["EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string()]
        );
    }

    #[test]
    fn ignores_ordinary_words() {
        assert!(candidate_addresses("just a normal post about the market").is_empty());
    }

    #[test]
    fn respects_length_boundaries() {
        let at_30 = "a".repeat(30);
        let at_50 = "b".repeat(50);
        let at_29 = "c".repeat(29);
        let at_51 = "d".repeat(51);
        let text = format!("{at_30} {at_50} {at_29} {at_51}");

        assert_eq!(candidate_addresses(&text), vec![at_30, at_50]);
    }

    #[test]
    fn deduplicates_repeated_candidates() {
        let addr = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
        let text = format!("{addr} again {addr}");
        assert_eq!(candidate_addresses(&text).len(), 1);
    }

    #[test]
    fn heuristic_is_permissive_about_content() {
        // Not an address at all, but within the length band: the heuristic
        // passes it through and the metadata lookup is expected to reject it.
        let text = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        assert_eq!(candidate_addresses(text).len(), 1);
    }
}
