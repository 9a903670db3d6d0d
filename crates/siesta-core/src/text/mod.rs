//! Grammar-driven text extraction.
//!
//! A [`Grammar`] is an ordered list of named [`Pattern`]s. Leaf patterns turn
//! their capture into a [`Value`] through a [`Transform`]; composite patterns
//! hand the captured region to a nested grammar. Absent matches never fail:
//! single patterns leave the name unset, repeating patterns store an empty
//! list.

mod transform;
mod value;

pub use transform::{Transform, coerce_token, parse_float_tokens, parse_fortran_f64};
pub use value::{Entry, Extraction, Value};

use crate::domain::Unit;
use regex::{Captures, Regex};

/// Floating point literal as printed by SIESTA (decimal point required).
pub const RE_FLOAT: &str = r"[-+]?\d+\.\d*(?:[DdEe][-+]\d+)?";
/// Single line break.
pub const RE_NEWLINE: &str = r"[\n\r]";

#[derive(Debug, Clone)]
pub enum PatternKind {
    Leaf(Transform),
    Composite(Grammar),
}

#[derive(Debug, Clone)]
pub struct Pattern {
    name: &'static str,
    regex: Regex,
    repeats: bool,
    unit: Option<Unit>,
    kind: PatternKind,
}

impl Pattern {
    /// # Panics
    ///
    /// Panics if `expression` is not a valid regular expression. Grammars are
    /// built from literal expressions, so this only fires on a programming
    /// error.
    pub fn leaf(name: &'static str, expression: &str) -> Self {
        Self::with_kind(name, expression, PatternKind::Leaf(Transform::Auto))
    }

    /// # Panics
    ///
    /// Panics if `expression` is not a valid regular expression.
    pub fn composite(name: &'static str, expression: &str, grammar: Grammar) -> Self {
        Self::with_kind(name, expression, PatternKind::Composite(grammar))
    }

    fn with_kind(name: &'static str, expression: &str, kind: PatternKind) -> Self {
        let regex = Regex::new(expression).unwrap_or_else(|error| {
            panic!("pattern '{name}' has an invalid expression: {error}")
        });
        Self {
            name,
            regex,
            repeats: false,
            unit: None,
            kind,
        }
    }

    pub fn repeats(mut self) -> Self {
        self.repeats = true;
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Replaces the transform of a leaf pattern; composites are unchanged.
    pub fn transform(mut self, transform: Transform) -> Self {
        if let PatternKind::Leaf(current) = &mut self.kind {
            *current = transform;
        }
        self
    }

    fn evaluate(&self, captured: &str) -> Option<Value> {
        match &self.kind {
            PatternKind::Leaf(transform) => transform.apply(captured),
            PatternKind::Composite(grammar) => Some(Value::Record(grammar.extract(captured))),
        }
    }

    fn extract_from(&self, text: &str) -> Option<Value> {
        if self.repeats {
            let items = self
                .regex
                .captures_iter(text)
                .filter_map(|captures| self.evaluate(&captured_text(&captures)))
                .collect();
            Some(Value::List(items))
        } else {
            self.regex
                .captures(text)
                .and_then(|captures| self.evaluate(&captured_text(&captures)))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Grammar {
    patterns: Vec<Pattern>,
}

impl Grammar {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    pub fn extend(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    /// Applies every pattern in order. For patterns sharing a name the first
    /// one producing a result wins.
    pub fn extract(&self, text: &str) -> Extraction {
        let mut extraction = Extraction::default();
        for pattern in &self.patterns {
            if !extraction.is_fillable(pattern.name) {
                continue;
            }
            if let Some(value) = pattern.extract_from(text) {
                extraction.insert(pattern.name, value, pattern.unit);
            }
        }
        extraction
    }
}

/// Participating groups joined by a space, or the whole match when the
/// expression has no groups.
fn captured_text(captures: &Captures<'_>) -> String {
    if captures.len() == 1 {
        return captures
            .get(0)
            .map(|whole| whole.as_str().to_string())
            .unwrap_or_default();
    }
    captures
        .iter()
        .skip(1)
        .flatten()
        .map(|group| group.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{Grammar, Pattern, RE_FLOAT, Transform, Value};
    use crate::domain::Unit;

    #[test]
    fn single_pattern_takes_first_match_and_unit() {
        let grammar = Grammar::new(vec![
            Pattern::leaf("energy", &format!(r"E = +({RE_FLOAT})"))
                .transform(Transform::Float)
                .unit(Unit::ElectronVolt),
        ]);
        let extraction = grammar.extract("E =  -1.50\nE = -2.00\n");
        assert_eq!(extraction.float("energy"), Some(-1.5));
        assert_eq!(extraction.unit_of("energy"), Some(Unit::ElectronVolt));
    }

    #[test]
    fn unmatched_patterns_are_absent_or_empty() {
        let grammar = Grammar::new(vec![
            Pattern::leaf("single", r"missing (\d+)"),
            Pattern::leaf("many", r"missing (\d+)").repeats(),
        ]);
        let extraction = grammar.extract("nothing to see");
        assert!(!extraction.contains("single"));
        assert_eq!(extraction.get("many"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn repeating_pattern_accumulates_in_document_order() {
        let grammar = Grammar::new(vec![
            Pattern::leaf("row", &format!(r"row +({RE_FLOAT} +{RE_FLOAT})")).repeats(),
        ]);
        let extraction = grammar.extract("row 1.0 2.0\nrow 3.0 4.0\nrow 5.0 6.0\n");
        assert_eq!(
            extraction.rows("row"),
            Some(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
        );
    }

    #[test]
    fn later_definitions_only_act_as_fallbacks() {
        let grammar = Grammar::new(vec![
            Pattern::leaf("stress", r"voigt: (\d+)").unit(Unit::Kilobar),
            Pattern::leaf("stress", r"static: (\d+)").unit(Unit::ElectronVoltPerAngstromCubed),
        ]);

        let both = grammar.extract("static: 2\nvoigt: 1\n");
        assert_eq!(both.int("stress"), Some(1));
        assert_eq!(both.unit_of("stress"), Some(Unit::Kilobar));

        let fallback = grammar.extract("static: 2\n");
        assert_eq!(fallback.int("stress"), Some(2));
        assert_eq!(
            fallback.unit_of("stress"),
            Some(Unit::ElectronVoltPerAngstromCubed)
        );
    }

    #[test]
    fn composite_patterns_parse_captured_regions_recursively() {
        let inner = Grammar::new(vec![
            Pattern::leaf("value", r"v=(\d+)").repeats(),
        ]);
        let grammar = Grammar::new(vec![
            Pattern::composite("block", r"(?s)(begin.+?end)", inner).repeats(),
        ]);
        let extraction =
            grammar.extract("v=0\nbegin v=1 v=2 end\nv=9\nbegin v=3 end\n");

        let blocks = extraction.records("block").collect::<Vec<_>>();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].array("value"), Some(vec![1.0, 2.0]));
        assert_eq!(blocks[1].array("value"), Some(vec![3.0]));
    }

    #[test]
    fn multiple_groups_are_joined_before_transform() {
        let grammar = Grammar::new(vec![
            Pattern::leaf("start", r"Start of run: +(\d+-[A-Z]+-\d+) +(\d+:\d+:\d+)")
                .transform(Transform::Text),
        ]);
        let extraction = grammar.extract(">> Start of run:  12-MAR-2021  10:15:32\n");
        assert_eq!(extraction.text("start"), Some("12-MAR-2021 10:15:32"));
    }

    #[test]
    fn expression_without_groups_uses_whole_match() {
        let grammar = Grammar::new(vec![
            Pattern::leaf("marker", r"PARALLEL version").transform(Transform::Flag),
        ]);
        assert_eq!(grammar.extract("PARALLEL version\n").flag("marker"), Some(true));
    }
}
