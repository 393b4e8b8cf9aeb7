//! Explanation of a session's score.
//!
//! Everything here is assembled on demand from the live terminal state of a
//! session with match tracking on. Nothing in this module feeds back into
//! scoring.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use scoreflow_core::score::Score;
use scoreflow_core::ConstraintRef;

use crate::tuple::{Element, Tuple, TupleValue};

/// A fact, or a value derived by `map`/grouping, taking part in a match.
///
/// Identity is the concrete type plus the `Debug` rendering, so one fact
/// reached through several tuples is the same `EntityRef`.
#[derive(Clone)]
pub struct EntityRef {
    element: Element,
    label: String,
}

impl EntityRef {
    pub fn new<T: TupleValue>(value: T) -> Self {
        Self::from_element(Arc::new(value))
    }

    pub(crate) fn from_element(element: Element) -> Self {
        let label = format!("{:?}", element);
        Self { element, label }
    }

    fn value(&self) -> &dyn TupleValue {
        &*self.element
    }

    /// Fully qualified type name of the referenced value.
    pub fn type_name(&self) -> &'static str {
        self.value().type_name()
    }

    pub fn short_type_name(&self) -> &'static str {
        let full = self.type_name();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// `Debug` form of the value.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn as_entity<T: 'static>(&self) -> Option<&T> {
        self.value().as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.short_type_name(), self.label)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.label == other.label
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name().hash(state);
        self.label.hash(state);
    }
}

/// The elements of a matching tuple, in tuple order.
#[derive(Debug, Clone, Default)]
pub struct ConstraintJustification {
    pub facts: Vec<EntityRef>,
}

impl ConstraintJustification {
    pub fn new(facts: Vec<EntityRef>) -> Self {
        Self { facts }
    }

    pub(crate) fn of_tuple(tuple: &Tuple) -> Self {
        let facts = tuple
            .elements()
            .iter()
            .cloned()
            .map(EntityRef::from_element)
            .collect();
        Self { facts }
    }
}

impl fmt::Display for ConstraintJustification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fact) in self.facts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{fact}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Signed contribution of this match to the score.
    pub score: Sc,
    pub justification: ConstraintJustification,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    pub fn new(constraint_ref: ConstraintRef, score: Sc, justification: ConstraintJustification) -> Self {
        Self {
            constraint_ref,
            score,
            justification,
        }
    }
}

/// Score and match count of one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub weight: Sc,
    pub score: Sc,
    pub match_count: usize,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

impl<Sc: Score> fmt::Display for ConstraintMatchTotal<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} matches, weight {})",
            self.constraint_ref, self.score, self.match_count, self.weight
        )
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintAnalysis<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub weight: Sc,
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
    /// The weight's first non-zero level is a hard level.
    pub is_hard: bool,
}

impl<Sc: Score> ConstraintAnalysis<Sc> {
    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }

    fn answers_to(&self, name: &str) -> bool {
        self.constraint_ref.name == name || self.constraint_ref.full_name() == name
    }
}

/// The score together with a breakdown per live constraint.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    pub analyses: Vec<ConstraintAnalysis<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn new(score: Sc, analyses: Vec<ConstraintAnalysis<Sc>>) -> Self {
        Self { score, analyses }
    }

    /// Looks a constraint up by name or by `package/name`.
    pub fn constraint(&self, name: &str) -> Option<&ConstraintAnalysis<Sc>> {
        self.analyses.iter().find(|analysis| analysis.answers_to(name))
    }

    /// Constraints currently contributing to the score.
    pub fn broken(&self) -> impl Iterator<Item = &ConstraintAnalysis<Sc>> {
        self.analyses.iter().filter(|analysis| !analysis.score.is_zero())
    }

    pub fn matches(&self) -> impl Iterator<Item = &ConstraintMatch<Sc>> {
        self.analyses.iter().flat_map(|analysis| &analysis.matches)
    }

    pub fn match_count(&self) -> usize {
        self.analyses.iter().map(|analysis| analysis.matches.len()).sum()
    }

    /// Human readable report: the score, then every broken constraint with
    /// up to `matches_per_constraint` of its matches.
    pub fn summary(&self, matches_per_constraint: usize) -> String {
        let mut out = format!("Score: {}\n", self.score);
        for analysis in self.broken() {
            out.push_str(&format!(
                "  {}: {} in {} matches\n",
                analysis.constraint_ref,
                analysis.score,
                analysis.matches.len()
            ));
            for m in analysis.matches.iter().take(matches_per_constraint) {
                out.push_str(&format!("    {}: {}\n", m.score, m.justification));
            }
            if analysis.matches.len() > matches_per_constraint {
                out.push_str("    ...\n");
            }
        }
        out
    }
}

/// Everything one entity is blamed for.
#[derive(Debug, Clone)]
pub struct Indictment<Sc: Score> {
    pub entity: EntityRef,
    /// Sum of the scores of `matches`.
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> Indictment<Sc> {
    fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            score: Sc::zero(),
            matches: Vec::new(),
        }
    }

    fn blame(&mut self, constraint_match: ConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.matches.push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Distinct constraints among the matches, first occurrence first.
    pub fn constraints(&self) -> Vec<&ConstraintRef> {
        let mut refs: Vec<&ConstraintRef> = Vec::new();
        for m in &self.matches {
            if !refs.contains(&&m.constraint_ref) {
                refs.push(&m.constraint_ref);
            }
        }
        refs
    }
}

/// Indictments keyed by entity, in first-seen order.
#[derive(Debug, Clone)]
pub struct IndictmentMap<Sc: Score> {
    indictments: IndexMap<EntityRef, Indictment<Sc>>,
}

impl<Sc: Score> IndictmentMap<Sc> {
    /// Blames every distinct entity of each match for the whole match.
    pub fn from_matches(matches: impl IntoIterator<Item = ConstraintMatch<Sc>>) -> Self {
        let mut indictments: IndexMap<EntityRef, Indictment<Sc>> = IndexMap::new();
        for m in matches {
            let facts = &m.justification.facts;
            for (i, fact) in facts.iter().enumerate() {
                if facts[..i].contains(fact) {
                    continue;
                }
                indictments
                    .entry(fact.clone())
                    .or_insert_with(|| Indictment::new(fact.clone()))
                    .blame(m.clone());
            }
        }
        Self { indictments }
    }

    pub fn get(&self, entity: &EntityRef) -> Option<&Indictment<Sc>> {
        self.indictments.get(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indictment<Sc>> {
        self.indictments.values()
    }

    /// Entities ordered from the most negative score up. Ties keep
    /// first-seen order.
    pub fn worst_entities(&self) -> Vec<&EntityRef> {
        let mut worst: Vec<&Indictment<Sc>> = self.indictments.values().collect();
        worst.sort_by(|a, b| a.score.cmp(&b.score));
        worst.into_iter().map(|indictment| &indictment.entity).collect()
    }

    pub fn len(&self) -> usize {
        self.indictments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indictments.is_empty()
    }
}

impl<Sc: Score> Default for IndictmentMap<Sc> {
    fn default() -> Self {
        Self {
            indictments: IndexMap::new(),
        }
    }
}
