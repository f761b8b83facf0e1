//! Canonical subject labels.

use std::collections::{BTreeMap, HashSet};

/// Maps free-text labels scraped from the price page to canonical subject names.
///
/// Unknown labels pass through unchanged after whitespace cleanup; they are
/// simply untracked.
#[derive(Debug, Clone, Default)]
pub struct LabelNormalizer {
    aliases: BTreeMap<String, String>,
    tracked: HashSet<String>,
}

impl LabelNormalizer {
    pub fn new<'a>(
        aliases: &BTreeMap<String, String>,
        tracked: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let aliases = aliases
            .iter()
            .map(|(from, to)| (clean_whitespace(from), clean_whitespace(to)))
            .collect();
        let tracked = tracked.into_iter().map(clean_whitespace).collect();
        Self { aliases, tracked }
    }

    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean_whitespace(raw);
        match self.aliases.get(&cleaned) {
            Some(canonical) => canonical.clone(),
            None => cleaned,
        }
    }

    pub fn is_tracked(&self, label: &str) -> bool {
        self.tracked.contains(label)
    }
}

fn is_space_variant(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{2000}'..='\u{200A}' | '\u{3000}'
        )
}

/// Trims and collapses every run of space-like characters into one ASCII space.
pub fn clean_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for ch in s.chars() {
        if is_space_variant(ch) {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}
