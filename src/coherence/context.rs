//! Disambiguation context: what the rest of the document is about.
//!
//! For the mention being scored, the context is the set of entity ids that
//! the *other* mentions of the document point at, minus the scored mention's
//! own candidates (a candidate must not vote for itself).
//!
//! ```text
//!   m1 "Paris"    {Paris, Paris_Hilton}
//!   m2 "France"   {France, France_national_team}     ← scoring m1
//!   m3 "Seine"    {Seine}
//!
//!   Broad  context(m1) = {France, France_national_team, Seine}
//!   Narrow context(m1) = {label(m2), label(m3)}
//! ```

use coherent_core::Mention;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What each sibling mention contributes to the context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ContextStrategy {
    /// Every candidate of every other mention (Cucerzan-style).
    #[default]
    #[cfg_attr(feature = "cli", value(alias = "cucerzan"))]
    #[serde(alias = "cucerzan")]
    Broad,
    /// Only the label currently assigned to every other mention (Vinculum-style).
    #[cfg_attr(feature = "cli", value(alias = "vinculum"))]
    #[serde(alias = "vinculum")]
    Narrow,
}

impl ContextStrategy {
    /// Entity ids `other` contributes under this strategy.
    pub fn contributions<'m>(self, other: &'m Mention) -> Box<dyn Iterator<Item = &'m str> + 'm> {
        match self {
            Self::Broad => Box::new(other.candidates.keys()),
            Self::Narrow => Box::new(std::iter::once(other.label.as_str())),
        }
    }

    /// Lowercase name, as used in config files and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Broad => "broad",
            Self::Narrow => "narrow",
        }
    }
}

/// Entity ids drawn from the other mentions of a document.
///
/// Borrows from the mentions it was built from; it lives only as long as one
/// scoring call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisambiguationContext<'m> {
    entities: HashSet<&'m str>,
}

impl<'m> DisambiguationContext<'m> {
    /// Build the context for `mention` from its sibling mentions.
    ///
    /// `others` must not include `mention` itself; the orchestrator passes
    /// every mention of the document except the one being scored. Whatever
    /// ends up in the union, `mention`'s own candidate keys are removed.
    pub fn build<I>(mention: &Mention, others: I, strategy: ContextStrategy) -> Self
    where
        I: IntoIterator<Item = &'m Mention>,
    {
        let mut entities: HashSet<&'m str> = HashSet::new();
        for other in others {
            entities.extend(strategy.contributions(other));
        }
        entities.retain(|id| !mention.candidates.contains(id));
        Self { entities }
    }

    /// Build from an explicit id set (mainly for tests and tools).
    pub fn from_ids(ids: impl IntoIterator<Item = &'m str>) -> Self {
        Self {
            entities: ids.into_iter().collect(),
        }
    }

    /// Number of distinct entity ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when nothing is left after self-exclusion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether `id` is part of the context.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains(id)
    }

    /// Context ids, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &'m str> + '_ {
        self.entities.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(label: &str, cands: &[(&str, f64)]) -> Mention {
        let mut m = Mention::new(label, 0, 1, label);
        for (id, score) in cands {
            m.candidates.insert(*id, *score);
        }
        m
    }

    fn sorted(ctx: &DisambiguationContext<'_>) -> Vec<String> {
        let mut ids: Vec<String> = ctx.iter().map(str::to_string).collect();
        ids.sort();
        ids
    }

    #[test]
    fn broad_unions_all_sibling_candidates() {
        let m1 = mention("Paris", &[("Paris", 0.9), ("Paris_Hilton", 0.1)]);
        let m2 = mention("France", &[("France", 0.8), ("France_national_team", 0.2)]);
        let m3 = mention("Seine", &[("Seine", 1.0)]);
        let ctx = DisambiguationContext::build(&m1, [&m2, &m3], ContextStrategy::Broad);
        assert_eq!(sorted(&ctx), vec!["France", "France_national_team", "Seine"]);
    }

    #[test]
    fn narrow_uses_assigned_labels_only() {
        let m1 = mention("Paris", &[("Paris", 0.9)]);
        let m2 = mention("France", &[("France", 0.8), ("France_national_team", 0.2)]);
        let m3 = mention("Seine", &[("Seine", 1.0), ("Seine_(band)", 0.3)]);
        let ctx = DisambiguationContext::build(&m1, [&m2, &m3], ContextStrategy::Narrow);
        assert_eq!(sorted(&ctx), vec!["France", "Seine"]);
    }

    #[test]
    fn own_candidates_are_excluded() {
        let m1 = mention("Georgia", &[("Georgia_(country)", 0.5), ("Georgia_(U.S._state)", 0.5)]);
        let m2 = mention("Atlanta", &[("Atlanta", 0.9), ("Georgia_(U.S._state)", 0.1)]);
        let ctx = DisambiguationContext::build(&m1, [&m2], ContextStrategy::Broad);
        assert!(!ctx.contains("Georgia_(U.S._state)"));
        assert_eq!(sorted(&ctx), vec!["Atlanta"]);
    }

    #[test]
    fn context_can_become_empty() {
        let m1 = mention("A", &[("A", 0.5), ("B", 0.5)]);
        let m2 = mention("B", &[("B", 1.0)]);
        let ctx = DisambiguationContext::build(&m1, [&m2], ContextStrategy::Broad);
        assert!(ctx.is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        let m1 = mention("x", &[("X", 1.0)]);
        let m2 = mention("y", &[("Y", 1.0), ("Z", 0.1)]);
        let m3 = mention("y", &[("Y", 1.0)]);
        let ctx = DisambiguationContext::build(&m1, [&m2, &m3], ContextStrategy::Broad);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn strategy_names_and_aliases() {
        assert_eq!(ContextStrategy::Broad.name(), "broad");
        let parsed: ContextStrategy = serde_json::from_str("\"vinculum\"").unwrap();
        assert_eq!(parsed, ContextStrategy::Narrow);
        let parsed: ContextStrategy = serde_json::from_str("\"broad\"").unwrap();
        assert_eq!(parsed, ContextStrategy::Broad);
    }
}
