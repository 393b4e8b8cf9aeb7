//! Scoring sessions.
//!
//! A [`Session`] holds the facts of one working solution and keeps their
//! score current. Facts are inserted, updated and retracted one at a time;
//! `calculate_score` returns the sum of every live constraint's impact.
//!
//! A session is owned by a single thread. Sessions opened from the same
//! [`SessionFactory`] share only the immutable compiled graph.
//!
//! Any [`StateError`] corrupts the session: the call that detected it
//! returns the error and every later call returns
//! [`StateError::SessionCorrupted`]. Build a new session instead.

mod backend;
mod factory;
mod graph;
mod incremental;
mod recompute;


use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use scoreflow_config::BackendKind;
use scoreflow_core::{
    ConfigurationError, ConstraintRef, Fact, InitializedScore, Score, ScoreflowError, StateError,
};

pub use backend::{ConstraintTotal, FactHandle, FactId, PropagationBackend};
pub use factory::{ConstraintProvider, SessionFactory, SessionFactoryBuilder};

use self::factory::SessionSettings;
use self::graph::ConstraintGraph;
use self::incremental::IncrementalBackend;
use self::recompute::RecomputeBackend;
use crate::api::analysis::{
    ConstraintAnalysis, ConstraintJustification, ConstraintMatch, ConstraintMatchTotal, IndictmentMap,
    ScoreExplanation,
};
use crate::stream::ConstraintState;
use crate::tuple::Element;

/// Facts of one type, by planning id.
struct FactTable<A: Fact> {
    by_id: HashMap<A::Id, (FactId, Arc<A>)>,
}

impl<A: Fact> Default for FactTable<A> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
        }
    }
}

type FactTables = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

fn table<A: Fact>(tables: &FactTables) -> Option<&FactTable<A>> {
    tables
        .get(&TypeId::of::<A>())
        .and_then(|table| table.downcast_ref::<FactTable<A>>())
}

fn fact_handle<A: Fact>(id: FactId, fact: &Arc<A>) -> FactHandle {
    let element: Element = Arc::clone(fact) as Element;
    FactHandle {
        id,
        type_id: TypeId::of::<A>(),
        type_name: type_name::<A>(),
        element,
        uninitialized: fact.uninitialized_variable_count(),
    }
}

/// Live scoring state of one working solution.
///
/// # Example
///
/// ```
/// use scoreflow_core::{Fact, HardSoftScore, PlanningId};
/// use scoreflow_scoring::stream::joiner::equal;
/// use scoreflow_scoring::{ConstraintFactory, SessionFactory};
///
/// #[derive(Debug, Clone)]
/// struct Lecture { id: u32, room: u32 }
///
/// impl PlanningId for Lecture {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
/// impl Fact for Lecture {}
///
/// let factory = SessionFactory::builder()
///     .build(|f: &ConstraintFactory<HardSoftScore>| {
///         vec![f
///             .for_each_unique_pair::<Lecture, _>(equal(|l: &Lecture| l.room))
///             .penalize(HardSoftScore::ONE_HARD)
///             .as_constraint("Room conflict")]
///     })
///     .unwrap();
///
/// let mut session = factory.create_session();
/// session.insert(Lecture { id: 1, room: 7 }).unwrap();
/// session.insert(Lecture { id: 2, room: 7 }).unwrap();
/// assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of(-1, 0));
///
/// session.update(Lecture { id: 2, room: 8 }).unwrap();
/// assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);
/// ```
pub struct Session<Sc: Score> {
    graph: Arc<ConstraintGraph<Sc>>,
    states: IndexMap<ConstraintRef, ConstraintState>,
    settings: SessionSettings,
    backend: Box<dyn PropagationBackend<Sc>>,
    /// From-scratch mirror used by the assert environment modes.
    shadow: Option<RecomputeBackend<Sc>>,
    tables: FactTables,
    next_id: u64,
    fact_count: usize,
    /// Sum of unassigned variables over all inserted facts.
    unassigned: u64,
    corrupted: bool,
    disposed: bool,
}

impl<Sc: Score> Session<Sc> {
    pub(crate) fn new(
        graph: Arc<ConstraintGraph<Sc>>,
        states: IndexMap<ConstraintRef, ConstraintState>,
        settings: SessionSettings,
    ) -> Self {
        let backend: Box<dyn PropagationBackend<Sc>> = match settings.backend {
            BackendKind::Incremental => Box::new(IncrementalBackend::new(Arc::clone(&graph))),
            BackendKind::Recompute => Box::new(RecomputeBackend::new(Arc::clone(&graph))),
        };
        let shadow = (settings.environment_mode.is_asserted()
            && settings.backend != BackendKind::Recompute)
            .then(|| RecomputeBackend::new(Arc::clone(&graph)));
        debug!(
            event = "session_created",
            backend = ?settings.backend,
            environment_mode = ?settings.environment_mode,
            constraints = graph.constraints.len(),
        );
        Self {
            graph,
            states,
            settings,
            backend,
            shadow,
            tables: HashMap::new(),
            next_id: 0,
            fact_count: 0,
            unassigned: 0,
            corrupted: false,
            disposed: false,
        }
    }

    fn check_usable(&self) -> Result<(), StateError> {
        if self.disposed {
            Err(StateError::SessionDisposed)
        } else if self.corrupted {
            Err(StateError::SessionCorrupted)
        } else {
            Ok(())
        }
    }

    fn fact_table<A: Fact>(&mut self) -> Result<&mut FactTable<A>, StateError> {
        let table = self
            .tables
            .entry(TypeId::of::<A>())
            .or_insert_with(|| Box::new(FactTable::<A>::default()));
        match table.downcast_mut::<FactTable<A>>() {
            Some(table) => Ok(table),
            None => {
                self.corrupted = true;
                Err(StateError::SessionCorrupted)
            }
        }
    }

    /// Marks the session corrupted when `result` is an error.
    fn poison<T>(&mut self, result: Result<T, StateError>) -> Result<T, StateError> {
        if let Err(error) = &result {
            debug!(event = "session_corrupted", error = %error);
            self.corrupted = true;
        }
        result
    }

    /// Forwards one mutation to the backend and, in assert modes, to the
    /// from-scratch mirror.
    fn propagate<F>(&mut self, mutation: F) -> Result<(), StateError>
    where
        F: Fn(&mut dyn PropagationBackend<Sc>) -> Result<(), StateError>,
    {
        let result = mutation(self.backend.as_mut()).and_then(|()| match self.shadow.as_mut() {
            Some(shadow) => mutation(shadow),
            None => Ok(()),
        });
        self.poison(result)
    }

    // ========================================================================
    // Fact mutations
    // ========================================================================

    /// Inserts a fact that is not yet in the session.
    ///
    /// # Errors
    ///
    /// [`StateError::FactAlreadyInserted`] when a fact with the same type and
    /// planning id is present.
    pub fn insert<A: Fact>(&mut self, fact: A) -> Result<(), StateError> {
        self.insert_shared(Arc::new(fact))
    }

    /// Inserts a fact the caller keeps a shared handle to.
    pub fn insert_shared<A: Fact>(&mut self, fact: Arc<A>) -> Result<(), StateError> {
        self.check_usable()?;
        let planning_id = fact.planning_id();
        let present = self.fact_table::<A>()?.by_id.contains_key(&planning_id);
        if present {
            return self.poison(Err(StateError::FactAlreadyInserted {
                fact_type: type_name::<A>(),
                id: format!("{:?}", planning_id),
            }));
        }

        let id = FactId(self.next_id);
        self.next_id += 1;
        trace!(event = "fact_insert", fact_type = type_name::<A>(), fact_id = ?planning_id);
        let handle = fact_handle(id, &fact);
        self.propagate(|backend| backend.insert(handle.clone()))?;

        self.unassigned += u64::from(fact.uninitialized_variable_count());
        self.fact_count += 1;
        self.fact_table::<A>()?
            .by_id
            .insert(planning_id, (id, fact));
        Ok(())
    }

    /// Replaces the fact with the same planning id.
    ///
    /// Observably identical to retracting the old value and inserting the
    /// new one.
    ///
    /// # Errors
    ///
    /// [`StateError::FactNotInserted`] when no fact with that id is present.
    pub fn update<A: Fact>(&mut self, fact: A) -> Result<(), StateError> {
        self.update_shared(Arc::new(fact))
    }

    pub fn update_shared<A: Fact>(&mut self, fact: Arc<A>) -> Result<(), StateError> {
        self.check_usable()?;
        let planning_id = fact.planning_id();
        let previous = self
            .fact_table::<A>()?
            .by_id
            .get(&planning_id)
            .map(|(id, old)| (*id, old.uninitialized_variable_count()));
        let Some((id, old_unassigned)) = previous else {
            return self.poison(Err(StateError::FactNotInserted {
                fact_type: type_name::<A>(),
                id: format!("{:?}", planning_id),
            }));
        };

        trace!(event = "fact_update", fact_type = type_name::<A>(), fact_id = ?planning_id);
        let handle = fact_handle(id, &fact);
        self.propagate(|backend| backend.update(handle.clone()))?;

        self.unassigned = self.unassigned - u64::from(old_unassigned)
            + u64::from(fact.uninitialized_variable_count());
        self.fact_table::<A>()?
            .by_id
            .insert(planning_id, (id, fact));
        Ok(())
    }

    /// Retracts the fact with the same planning id as `fact`.
    pub fn retract<A: Fact>(&mut self, fact: &A) -> Result<Arc<A>, StateError> {
        self.retract_by_id::<A>(&fact.planning_id())
    }

    /// Retracts a fact by planning id and returns the stored value.
    ///
    /// # Errors
    ///
    /// [`StateError::FactNotInserted`] when no fact with that id is present.
    pub fn retract_by_id<A: Fact>(&mut self, planning_id: &A::Id) -> Result<Arc<A>, StateError> {
        self.check_usable()?;
        let removed = self
            .fact_table::<A>()?
            .by_id
            .remove(planning_id);
        let Some((id, fact)) = removed else {
            return self.poison(Err(StateError::FactNotInserted {
                fact_type: type_name::<A>(),
                id: format!("{:?}", planning_id),
            }));
        };

        trace!(event = "fact_retract", fact_type = type_name::<A>(), fact_id = ?planning_id);
        self.propagate(|backend| backend.retract(id))?;

        self.unassigned -= u64::from(fact.uninitialized_variable_count());
        self.fact_count -= 1;
        Ok(fact)
    }

    pub fn contains<A: Fact>(&self, planning_id: &A::Id) -> bool {
        table::<A>(&self.tables).is_some_and(|table| table.by_id.contains_key(planning_id))
    }

    /// The value last inserted or updated under `planning_id`.
    pub fn get<A: Fact>(&self, planning_id: &A::Id) -> Option<Arc<A>> {
        table::<A>(&self.tables)
            .and_then(|table| table.by_id.get(planning_id))
            .map(|(_, fact)| Arc::clone(fact))
    }

    pub fn fact_count(&self) -> usize {
        self.fact_count
    }

    // ========================================================================
    // Score
    // ========================================================================

    /// Sum of every live constraint's impact over the current facts.
    ///
    /// # Errors
    ///
    /// [`StateError::ScoreCorruption`] in the assert environment modes when
    /// the incremental state disagrees with a from-scratch evaluation.
    pub fn calculate_score(&mut self) -> Result<Sc, StateError> {
        self.check_usable()?;
        let result = self.score_checked();
        let score = self.poison(result)?;
        trace!(event = "calculate_score", score = %score, facts = self.fact_count);
        Ok(score)
    }

    fn score_checked(&mut self) -> Result<Sc, StateError> {
        let actual = self.backend.score()?;
        let Some(shadow) = self.shadow.as_mut() else {
            return Ok(actual);
        };

        if self.settings.environment_mode.is_fully_asserted() {
            let actual_totals = self.backend.constraint_totals()?;
            let expected_totals = shadow.constraint_totals()?;
            for ((constraint, actual), expected) in self
                .graph
                .constraints
                .iter()
                .zip(&actual_totals)
                .zip(&expected_totals)
            {
                if actual != expected {
                    return Err(StateError::ScoreCorruption {
                        constraint: Some(constraint.constraint_ref.full_name()),
                        expected: format!("{} ({} matches)", expected.score, expected.match_count),
                        actual: format!("{} ({} matches)", actual.score, actual.match_count),
                    });
                }
            }
        }

        let expected = shadow.score()?;
        if actual != expected {
            return Err(StateError::ScoreCorruption {
                constraint: None,
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(actual)
    }

    /// `-n` while `n` planning variables of inserted facts are unassigned.
    pub fn init_score(&self) -> i32 {
        i32::try_from(self.unassigned).map_or(i32::MIN, |unassigned| -unassigned)
    }

    pub fn calculate_initialized_score(&mut self) -> Result<InitializedScore<Sc>, StateError> {
        let score = self.calculate_score()?;
        Ok(InitializedScore::new(self.init_score(), score))
    }

    /// Best score reachable from the current one under the configured
    /// initializing score trend.
    pub fn optimistic_bound(&mut self) -> Result<Sc, StateError> {
        let score = self.calculate_score()?;
        Ok(score.optimistic_bound(&self.settings.score_trend))
    }

    pub fn pessimistic_bound(&mut self) -> Result<Sc, StateError> {
        let score = self.calculate_score()?;
        Ok(score.pessimistic_bound(&self.settings.score_trend))
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    fn check_tracking(&self) -> Result<(), ScoreflowError> {
        self.check_usable()?;
        if self.settings.match_tracking {
            Ok(())
        } else {
            Err(ConfigurationError::MatchTrackingDisabled.into())
        }
    }

    fn live_matches(&mut self, constraint: usize) -> Result<Vec<ConstraintMatch<Sc>>, StateError> {
        let matches = self.backend.matches(constraint);
        let matches = self.poison(matches)?;
        let constraint_ref = &self.graph.constraints[constraint].constraint_ref;
        Ok(matches
            .into_iter()
            .map(|(tuple, score)| {
                ConstraintMatch::new(
                    constraint_ref.clone(),
                    score,
                    ConstraintJustification::of_tuple(&tuple),
                )
            })
            .collect())
    }

    /// Score and match count of every live constraint, in declaration order.
    pub fn constraint_match_totals(&mut self) -> Result<Vec<ConstraintMatchTotal<Sc>>, ScoreflowError> {
        self.check_tracking()?;
        let totals = self.backend.constraint_totals();
        let totals = self.poison(totals)?;
        Ok(self
            .graph
            .constraints
            .iter()
            .zip(totals)
            .map(|(constraint, total)| ConstraintMatchTotal {
                constraint_ref: constraint.constraint_ref.clone(),
                weight: constraint.weight,
                score: total.score,
                match_count: total.match_count,
            })
            .collect())
    }

    /// Current matches of one constraint. Empty for pruned constraints.
    pub fn constraint_matches(&mut self, constraint: &ConstraintRef) -> Result<Vec<ConstraintMatch<Sc>>, ScoreflowError> {
        self.check_tracking()?;
        let index = self
            .graph
            .constraints
            .iter()
            .position(|live| &live.constraint_ref == constraint);
        match index {
            Some(index) => Ok(self.live_matches(index)?),
            None => Ok(Vec::new()),
        }
    }

    /// Per-constraint breakdown of the current score.
    pub fn explain_score(&mut self) -> Result<ScoreExplanation<Sc>, ScoreflowError> {
        self.check_tracking()?;
        let score = self.calculate_score()?;
        let mut analyses = Vec::with_capacity(self.graph.constraints.len());
        for index in 0..self.graph.constraints.len() {
            let matches = self.live_matches(index)?;
            let constraint = &self.graph.constraints[index];
            analyses.push(ConstraintAnalysis {
                constraint_ref: constraint.constraint_ref.clone(),
                weight: constraint.weight,
                score: matches
                    .iter()
                    .fold(Sc::zero(), |total, m| total + m.score),
                matches,
                is_hard: constraint.is_hard(),
            });
        }
        Ok(ScoreExplanation::new(score, analyses))
    }

    /// Impact of the current matches per fact (or derived value).
    pub fn indictment_map(&mut self) -> Result<IndictmentMap<Sc>, ScoreflowError> {
        self.check_tracking()?;
        let mut matches = Vec::new();
        for index in 0..self.graph.constraints.len() {
            matches.extend(self.live_matches(index)?);
        }
        Ok(IndictmentMap::from_matches(matches))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// `Live` for constraints propagating in this session, `Pruned` for
    /// zero-weight ones and `Disposed` once the session is disposed.
    pub fn constraint_state(&self, constraint: &ConstraintRef) -> Option<ConstraintState> {
        self.states.get(constraint).map(|state| match state {
            ConstraintState::Pruned => ConstraintState::Pruned,
            _ if self.disposed => ConstraintState::Disposed,
            _ => ConstraintState::Live,
        })
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn is_corrupted(&self) -> bool {
        self.corrupted
    }

    /// Drops all facts and live state. Every later call returns
    /// [`StateError::SessionDisposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.backend.clear();
        if let Some(shadow) = self.shadow.as_mut() {
            shadow.clear();
        }
        self.tables.clear();
        self.fact_count = 0;
        self.unassigned = 0;
        self.disposed = true;
        debug!(event = "session_disposed", corrupted = self.corrupted);
    }
}

impl<Sc: Score> fmt::Debug for Session<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.settings.backend)
            .field("facts", &self.fact_count)
            .field("corrupted", &self.corrupted)
            .field("disposed", &self.disposed)
            .finish()
    }
}
