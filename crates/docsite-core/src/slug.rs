//! URL-safe anchor identifiers for heading text.
//!
//! [`slugify`] is a pure normalization; [`SlugAllocator`] adds per-pass
//! uniqueness on top of it. An allocator belongs to exactly one extraction
//! or render pass and is dropped afterwards, so ids never leak between
//! documents.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Base used when text normalizes to nothing (only punctuation or symbols).
pub const FALLBACK_SLUG: &str = "section";

const SEPARATOR: char = '-';

/// Normalize text into a lowercase, `-`-separated ASCII slug.
///
/// Non-ASCII text is transliterated, `&` reads as "and", camel case is
/// split into words, and every run of other characters becomes a single
/// separator. The result may be empty.
///
/// ```rust
/// use docsite_core::slug::slugify;
///
/// assert_eq!(slugify("Coherent OFDM Radar Backscatter"), "coherent-ofdm-radar-backscatter");
/// assert_eq!(slugify("Crème brûlée & Café"), "creme-brulee-and-cafe");
/// assert_eq!(slugify("useState hook"), "use-state-hook");
/// ```
pub fn slugify(text: &str) -> String {
    let replaced = text.replace('&', " and ");
    let ascii = deunicode::deunicode(&replaced);
    let words = decamelize(&ascii);

    let mut slug = String::with_capacity(words.len());
    let mut pending_separator = false;

    for ch in words.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Split camel-case boundaries with spaces: `fooBar` → `foo Bar`,
/// `XMLHttp` → `XML Http`, `UAV2` → `UAV 2`. Trailing plural `s` after an
/// acronym (`APIs`) stays attached.
fn decamelize(text: &str) -> String {
    static RULES: OnceLock<[Regex; 4]> = OnceLock::new();
    #[allow(clippy::expect_used)]
    let rules = RULES.get_or_init(|| {
        [
            r"([A-Z]{2,})(\d+)",
            r"([a-z\d]+)([A-Z]{2,})",
            r"([a-z\d])([A-Z])",
            r"([A-Z]+)([A-Z][a-rt-z\d]+)",
        ]
        .map(|pattern| Regex::new(pattern).expect("decamelize regex is valid"))
    });

    rules.iter().fold(text.to_string(), |acc, rule| {
        rule.replace_all(&acc, "$1 $2").into_owned()
    })
}

/// Hands out slugs that are unique within one pass.
///
/// The first request for a given base returns it unchanged; later requests
/// get `base-2`, `base-3`, and so on, skipping anything already handed out.
///
/// ```rust
/// use docsite_core::SlugAllocator;
///
/// let mut slugs = SlugAllocator::new();
/// assert_eq!(slugs.allocate("Intro"), "intro");
/// assert_eq!(slugs.allocate("Intro"), "intro-2");
/// assert_eq!(slugs.allocate("intro!"), "intro-3");
/// ```
#[derive(Debug, Default)]
pub struct SlugAllocator {
    emitted: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl SlugAllocator {
    /// Allocator with no ids handed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id for `text`.
    pub fn allocate(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }

        if self.emitted.insert(base.clone()) {
            self.counters.insert(base.clone(), 1);
            return base;
        }

        let counter = self.counters.entry(base.clone()).or_insert(1);
        loop {
            *counter += 1;
            let candidate = format!("{base}{SEPARATOR}{counter}");
            if self.emitted.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Number of ids handed out so far.
    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    /// Whether no id has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }
}
