//! Session factory: validates a constraint set once, compiles it into an
//! immutable graph template and opens sessions over it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use scoreflow_config::{BackendKind, ConfigError, EnvironmentMode, NullityPolicy, ScoringConfig};
use scoreflow_core::{
    ConfigurationError, ConstraintRef, DefinitionError, InitializingScoreTrend, ParseableScore,
    Score, ScoreflowError,
};

use super::graph::{validate_plan, ConstraintGraph};
use super::Session;
use crate::api::weight_overrides::{ConstraintWeightOverrides, WeightProvider};
use crate::stream::plan::FactoryContext;
use crate::stream::{Constraint, ConstraintFactory, ConstraintState, ConstraintWeight};

/// Anything that declares a constraint set against a factory.
///
/// Implemented for closures `Fn(&ConstraintFactory<Sc>) -> Vec<Constraint<Sc>>`.
pub trait ConstraintProvider<Sc: Score> {
    fn define_constraints(&self, factory: &ConstraintFactory<Sc>) -> Vec<Constraint<Sc>>;
}

impl<Sc, F> ConstraintProvider<Sc> for F
where
    Sc: Score,
    F: Fn(&ConstraintFactory<Sc>) -> Vec<Constraint<Sc>>,
{
    fn define_constraints(&self, factory: &ConstraintFactory<Sc>) -> Vec<Constraint<Sc>> {
        self(factory)
    }
}

/// Settings shared by every session of a factory.
#[derive(Debug, Clone)]
pub(crate) struct SessionSettings {
    pub(crate) backend: BackendKind,
    pub(crate) environment_mode: EnvironmentMode,
    pub(crate) match_tracking: bool,
    pub(crate) score_trend: InitializingScoreTrend,
}

/// Builder of a [`SessionFactory`].
///
/// # Example
///
/// ```
/// use scoreflow_config::BackendKind;
/// use scoreflow_core::{Fact, PlanningId, SimpleScore};
/// use scoreflow_scoring::{ConstraintFactory, SessionFactory};
///
/// #[derive(Debug)]
/// struct Task { id: u32, late: bool }
///
/// impl PlanningId for Task {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
/// impl Fact for Task {}
///
/// let factory = SessionFactory::builder()
///     .with_backend(BackendKind::Recompute)
///     .build(|f: &ConstraintFactory<SimpleScore>| {
///         vec![f
///             .for_each::<Task>()
///             .filter(|t: &Task| t.late)
///             .penalize(SimpleScore::ONE)
///             .as_constraint("Late task")]
///     })
///     .unwrap();
///
/// let mut session = factory.create_session();
/// session.insert(Task { id: 1, late: true }).unwrap();
/// assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1));
/// ```
pub struct SessionFactoryBuilder<Sc: Score> {
    backend: BackendKind,
    environment_mode: EnvironmentMode,
    match_tracking: bool,
    nullity: NullityPolicy,
    default_package: String,
    score_trend: Option<InitializingScoreTrend>,
    overrides: ConstraintWeightOverrides<Sc>,
    provider: Option<Arc<dyn WeightProvider<Sc>>>,
}

impl<Sc: Score> Default for SessionFactoryBuilder<Sc> {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            environment_mode: EnvironmentMode::default(),
            match_tracking: true,
            nullity: NullityPolicy::default(),
            default_package: String::new(),
            score_trend: None,
            overrides: ConstraintWeightOverrides::new(),
            provider: None,
        }
    }
}

impl<Sc: Score> SessionFactoryBuilder<Sc> {
    /// Applies every setting of a scoring configuration, including its
    /// constraint weights.
    pub fn with_config(mut self, config: &ScoringConfig) -> Result<Self, ConfigError>
    where
        Sc: ParseableScore,
    {
        self.backend = config.backend;
        self.environment_mode = config.environment_mode;
        self.match_tracking = config.constraint_match_enabled;
        self.nullity = config.nullity_policy;
        if let Some(package) = &config.default_constraint_package {
            self.default_package = package.clone();
        }
        if let Some(trend) = config.score_trend()? {
            self.score_trend = Some(trend);
        }
        self.overrides
            .extend(ConstraintWeightOverrides::from_config(config)?);
        Ok(self)
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Weight source consulted before the configured weights.
    pub fn with_weights(mut self, provider: impl WeightProvider<Sc> + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    pub fn with_match_tracking(mut self, enabled: bool) -> Self {
        self.match_tracking = enabled;
        self
    }

    pub fn with_nullity_policy(mut self, policy: NullityPolicy) -> Self {
        self.nullity = policy;
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_default_package(mut self, package: impl Into<String>) -> Self {
        self.default_package = package.into();
        self
    }

    pub fn with_score_trend(mut self, trend: InitializingScoreTrend) -> Self {
        self.score_trend = Some(trend);
        self
    }

    fn resolve_weight(&self, constraint: &ConstraintRef) -> Option<Sc> {
        self.provider
            .as_ref()
            .and_then(|provider| provider.resolve(constraint))
            .or_else(|| self.overrides.resolve(constraint))
    }

    /// Declares the constraint set and compiles it.
    ///
    /// # Errors
    ///
    /// [`DefinitionError`] for empty or duplicate names, negative fixed
    /// weights and malformed joiner chains; [`ConfigurationError`] for a
    /// configurable constraint without a weight.
    pub fn build(self, provider: impl ConstraintProvider<Sc>) -> Result<SessionFactory<Sc>, ScoreflowError> {
        let factory = ConstraintFactory::with_context(FactoryContext {
            nullity: self.nullity,
            default_package: self.default_package.clone(),
        });
        let constraints = provider.define_constraints(&factory);

        let mut seen = HashSet::with_capacity(constraints.len());
        for constraint in &constraints {
            let constraint_ref = constraint.constraint_ref();
            if constraint_ref.name.is_empty() {
                return Err(DefinitionError::EmptyConstraintName.into());
            }
            if !seen.insert(constraint_ref.full_name()) {
                return Err(DefinitionError::DuplicateConstraint {
                    id: constraint_ref.full_name(),
                }
                .into());
            }
            if let ConstraintWeight::Fixed(weight) = constraint.weight() {
                if weight < Sc::zero() {
                    return Err(DefinitionError::NegativeConstraintWeight {
                        constraint: constraint_ref.full_name(),
                        weight: weight.to_string(),
                    }
                    .into());
                }
            }
            validate_plan(constraint_ref, &constraint.node)?;
        }

        let mut states = IndexMap::with_capacity(constraints.len());
        let mut live = Vec::with_capacity(constraints.len());
        for constraint in constraints {
            let constraint_ref = constraint.constraint_ref().clone();
            let weight = match constraint.weight() {
                ConstraintWeight::Fixed(weight) => weight,
                ConstraintWeight::Configurable => {
                    let weight = self.resolve_weight(&constraint_ref).ok_or_else(|| {
                        ConfigurationError::MissingConstraintWeight {
                            constraint: constraint_ref.full_name(),
                        }
                    })?;
                    if weight < Sc::zero() {
                        return Err(DefinitionError::NegativeConstraintWeight {
                            constraint: constraint_ref.full_name(),
                            weight: weight.to_string(),
                        }
                        .into());
                    }
                    weight
                }
            };
            if weight.is_zero() {
                debug!(event = "constraint_pruned", constraint = %constraint_ref);
                states.insert(constraint_ref, ConstraintState::Pruned);
                continue;
            }
            states.insert(constraint_ref.clone(), ConstraintState::Built);
            live.push((
                constraint_ref,
                constraint.impact_type(),
                weight,
                constraint.weigher,
                constraint.node,
            ));
        }

        let graph = ConstraintGraph::compile(live);
        info!(
            event = "session_factory_built",
            live = graph.constraints.len(),
            pruned = states.len() - graph.constraints.len(),
            nodes = graph.nodes.len(),
            backend = ?self.backend,
        );

        Ok(SessionFactory {
            graph: Arc::new(graph),
            states,
            settings: SessionSettings {
                backend: self.backend,
                environment_mode: self.environment_mode,
                match_tracking: self.match_tracking,
                score_trend: self.score_trend.unwrap_or_default(),
            },
        })
    }
}

/// Compiled constraint set; opens independent sessions that share its
/// immutable graph template.
pub struct SessionFactory<Sc: Score> {
    graph: Arc<ConstraintGraph<Sc>>,
    states: IndexMap<ConstraintRef, ConstraintState>,
    settings: SessionSettings,
}

impl<Sc: Score> SessionFactory<Sc> {
    pub fn builder() -> SessionFactoryBuilder<Sc> {
        SessionFactoryBuilder::default()
    }

    /// `Built` for live constraints, `Pruned` for zero-weight ones, `None`
    /// for constraints not in the set.
    pub fn constraint_state(&self, constraint: &ConstraintRef) -> Option<ConstraintState> {
        self.states.get(constraint).copied()
    }

    /// Every declared constraint in declaration order.
    pub fn constraint_refs(&self) -> impl Iterator<Item = &ConstraintRef> {
        self.states.keys()
    }

    pub fn live_constraint_count(&self) -> usize {
        self.graph.constraints.len()
    }

    pub fn backend(&self) -> BackendKind {
        self.settings.backend
    }

    pub fn create_session(&self) -> Session<Sc> {
        Session::new(Arc::clone(&self.graph), self.states.clone(), self.settings.clone())
    }
}

impl<Sc: Score> fmt::Debug for SessionFactory<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactory")
            .field("constraints", &self.states)
            .field("nodes", &self.graph.nodes.len())
            .field("backend", &self.settings.backend)
            .finish()
    }
}
