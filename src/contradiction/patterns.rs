use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::error::Result;

/// Declarative antonym rule, as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub label: String,
    pub positive: String,
    pub negative: String,
}

impl PatternSpec {
    pub fn new(label: &str, positive: &str, negative: &str) -> Self {
        Self {
            label: label.to_string(),
            positive: positive.to_string(),
            negative: negative.to_string(),
        }
    }
}

/// Built-in rules, in evaluation order
pub fn default_specs() -> Vec<PatternSpec> {
    vec![
        PatternSpec::new("must/must not", r"\bmust\b", r"\bmust not\b"),
        PatternSpec::new("should/should not", r"\bshould\b", r"\bshould not\b"),
        PatternSpec::new("always/never", r"\balways\b", r"\bnever\b"),
        PatternSpec::new("required/optional", r"\brequired\b", r"\boptional\b"),
        PatternSpec::new("will/won't", r"\bwill\b", r"\bwon't\b"),
        PatternSpec::new("does/doesn't", r"\bdoes\b", r"\bdoesn't\b"),
        PatternSpec::new("is/isn't", r"\bis\b", r"\bisn't\b"),
        PatternSpec::new("enable/disable", r"\benable", r"\bdisable"),
        PatternSpec::new("allow/deny", r"\ballow", r"\bdeny|\bprevent"),
        PatternSpec::new("sync/async", r"\bsync", r"\basync"),
        PatternSpec::new("client/server", r"\bclient", r"\bserver"),
        PatternSpec::new("public/private", r"\bpublic\b", r"\bprivate\b"),
        PatternSpec::new("yes/no", r"\byes\b", r"\bno\b"),
        PatternSpec::new("true/false", r"\btrue\b", r"\bfalse\b"),
        PatternSpec::new("are/aren't", r"\bare\b", r"\baren't\b"),
    ]
}

static DEFAULT_TABLE: Lazy<PatternTable> =
    Lazy::new(|| PatternTable::from_specs(&default_specs()).expect("built-in antonym patterns compile"));

/// One compiled (positive, negative) rule
#[derive(Debug, Clone)]
pub struct AntonymPattern {
    pub label: String,
    positive: Regex,
    negative: Regex,
}

impl AntonymPattern {
    /// Compile a rule; both sides match case-insensitively
    pub fn new(label: &str, positive: &str, negative: &str) -> Result<Self> {
        Ok(Self {
            label: label.to_string(),
            positive: RegexBuilder::new(positive).case_insensitive(true).build()?,
            negative: RegexBuilder::new(negative).case_insensitive(true).build()?,
        })
    }

    /// Positive form present outside any negative form
    ///
    /// The `must` inside `must not` is part of the negative phrase and does
    /// not count on its own.
    pub fn matches_positive(&self, text: &str) -> bool {
        let negatives: Vec<(usize, usize)> = self
            .negative
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();
        self.positive.find_iter(text).any(|m| {
            !negatives
                .iter()
                .any(|&(start, end)| start <= m.start() && m.end() <= end)
        })
    }

    pub fn matches_negative(&self, text: &str) -> bool {
        self.negative.is_match(text)
    }
}

/// Which rules a text affirms and which it negates
///
/// Bit `i` stands for rule `i` of the [`PatternTable`] that produced the
/// mask. Scanning is the only regex work; comparing two masks is bitwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchMask {
    positive: SmallVec<[u64; 1]>,
    negative: SmallVec<[u64; 1]>,
}

impl MatchMask {
    fn with_rules(rules: usize) -> Self {
        let words = rules.div_ceil(64);
        Self {
            positive: smallvec![0; words],
            negative: smallvec![0; words],
        }
    }

    fn set(bits: &mut [u64], rule: usize) {
        bits[rule / 64] |= 1 << (rule % 64);
    }

    /// No rule fired either way
    pub fn is_empty(&self) -> bool {
        self.positive.iter().chain(self.negative.iter()).all(|&w| w == 0)
    }
}

/// Ordered list of antonym rules evaluated by one routine
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<AntonymPattern>,
}

impl Default for PatternTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl PatternTable {
    pub fn from_specs(specs: &[PatternSpec]) -> Result<Self> {
        let patterns = specs
            .iter()
            .map(|s| AntonymPattern::new(&s.label, &s.positive, &s.negative))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Append extra rules after the existing ones
    pub fn extend_from_specs(&mut self, specs: &[PatternSpec]) -> Result<()> {
        for s in specs {
            self.patterns
                .push(AntonymPattern::new(&s.label, &s.positive, &s.negative)?);
        }
        Ok(())
    }

    /// Run every rule over `text` once
    pub fn scan(&self, text: &str) -> MatchMask {
        let mut mask = MatchMask::with_rules(self.patterns.len());
        for (i, p) in self.patterns.iter().enumerate() {
            if p.matches_positive(text) {
                MatchMask::set(&mut mask.positive, i);
            }
            if p.matches_negative(text) {
                MatchMask::set(&mut mask.negative, i);
            }
        }
        mask
    }

    /// First rule (in table order) one mask affirms and the other negates
    ///
    /// Both masks must come from [`Self::scan`] on this table.
    pub fn opposition(&self, a: &MatchMask, b: &MatchMask) -> Option<&AntonymPattern> {
        let words = a.positive.iter().zip(&a.negative).zip(b.positive.iter().zip(&b.negative));
        for (w, ((pa, na), (pb, nb))) in words.enumerate() {
            let hit = (pa & nb) | (na & pb);
            if hit != 0 {
                return self.patterns.get(w * 64 + hit.trailing_zeros() as usize);
            }
        }
        None
    }

    /// First rule (in table order) on which `a` and `b` disagree
    pub fn find_opposition(&self, a: &str, b: &str) -> Option<&AntonymPattern> {
        self.opposition(&self.scan(a), &self.scan(b))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AntonymPattern> {
        self.patterns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn required_vs_optional() {
        let table = PatternTable::default();
        let hit = table
            .find_opposition("Deployment is required.", "Deployment is optional.")
            .unwrap();
        assert_eq!(hit.label, "required/optional");
        // symmetric
        let hit = table
            .find_opposition("Deployment is optional.", "Deployment is required.")
            .unwrap();
        assert_eq!(hit.label, "required/optional");
    }

    #[test]
    fn must_inside_must_not_is_not_positive() {
        let table = PatternTable::default();
        assert!(table
            .find_opposition("You must not commit secrets.", "You must not push to main.")
            .is_none());
        let hit = table
            .find_opposition("You must sign commits.", "You must not sign commits.")
            .unwrap();
        assert_eq!(hit.label, "must/must not");
    }

    #[test]
    fn matching_ignores_case() {
        let table = PatternTable::default();
        let hit = table
            .find_opposition("ALWAYS rebase.", "Never rebase.")
            .unwrap();
        assert_eq!(hit.label, "always/never");
    }

    #[test]
    fn prefix_patterns_do_not_cross_words() {
        let table = PatternTable::default();
        // `\bsync` does not match inside "async"
        assert!(table.find_opposition("Calls are async.", "Calls are async too.").is_none());
    }

    #[test]
    fn boolean_and_plural_rules() {
        let table = PatternTable::default();
        let hit = table
            .find_opposition("Caching enabled: true", "Caching enabled: false")
            .unwrap();
        assert_eq!(hit.label, "true/false");
        let hit = table.find_opposition("Retry on timeout? Yes.", "Retry on timeout? No.").unwrap();
        assert_eq!(hit.label, "yes/no");
        let hit = table
            .find_opposition("Plugins are sandboxed.", "Plugins aren't sandboxed.")
            .unwrap();
        assert_eq!(hit.label, "are/aren't");
        // "not" and "none" are not "no"
        assert!(table.find_opposition("Yes, it works.", "It does not work, none do.").is_none());
    }

    #[test]
    fn masks_compare_like_text() {
        let table = PatternTable::default();
        let required = table.scan("Deployment is required.");
        let optional = table.scan("Deployment is optional.");
        let plain = table.scan("Builds run nightly.");
        assert!(plain.is_empty());
        assert_eq!(table.opposition(&required, &optional).unwrap().label, "required/optional");
        assert!(table.opposition(&required, &plain).is_none());
        assert!(table.opposition(&required, &required).is_none());
    }

    #[test]
    fn masks_cover_tables_past_one_word() {
        let specs: Vec<PatternSpec> = (0..70)
            .map(|i| PatternSpec::new(&format!("r{i}"), &format!(r"\bp{i}\b"), &format!(r"\bn{i}\b")))
            .collect();
        let table = PatternTable::from_specs(&specs).unwrap();
        let hit = table.opposition(&table.scan("p68 here"), &table.scan("n68 there")).unwrap();
        assert_eq!(hit.label, "r68");
        assert!(table.opposition(&table.scan("p68"), &table.scan("n67")).is_none());
    }

    #[test]
    fn extend_and_invalid_specs() {
        let mut table = PatternTable::default();
        let before = table.len();
        table
            .extend_from_specs(&[PatternSpec::new("on/off", r"\bon\b", r"\boff\b")])
            .unwrap();
        assert_eq!(table.len(), before + 1);
        assert_eq!(table.find_opposition("logging on", "logging off").unwrap().label, "on/off");

        let err = PatternTable::from_specs(&[PatternSpec::new("bad", "(", "x")]).unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }
}
