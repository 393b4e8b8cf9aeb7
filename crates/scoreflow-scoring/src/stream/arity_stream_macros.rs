//! Macros for generating arity-specific constraint streams.
//!
//! Uni/Bi/Tri/Quad streams share one runtime representation and differ only
//! in the element types they downcast to. Operations whose output arity
//! depends on the input arity (`join`, `flatten_last`) live in the
//! individual stream files.

/// Generates the stream struct and every operation common to all arities.
///
/// `$t : $idx` pairs name each element type and its tuple position.
macro_rules! impl_arity_stream {
    ($stream:ident, $($t:ident : $idx:tt),+) => {
        pub struct $stream<$($t,)+ Sc: scoreflow_core::Score> {
            pub(crate) node: std::sync::Arc<$crate::stream::plan::StreamNode>,
            pub(crate) cx: std::sync::Arc<$crate::stream::plan::FactoryContext>,
            _marker: std::marker::PhantomData<fn() -> ($($t,)+ Sc)>,
        }

        impl<$($t,)+ Sc> $stream<$($t,)+ Sc>
        where
            $($t: std::fmt::Debug + Send + Sync + 'static,)+
            Sc: scoreflow_core::Score,
        {
            pub(crate) fn from_node(
                node: std::sync::Arc<$crate::stream::plan::StreamNode>,
                cx: std::sync::Arc<$crate::stream::plan::FactoryContext>,
            ) -> Self {
                Self {
                    node,
                    cx,
                    _marker: std::marker::PhantomData,
                }
            }

            /// True when this stream can never emit the same tuple twice.
            pub fn guarantees_distinct(&self) -> bool {
                self.node.distinct
            }

            pub fn filter<P>(self, predicate: P) -> Self
            where
                P: Fn($(&$t),+) -> bool + Send + Sync + 'static,
            {
                let spec = $crate::node::FilterSpec::new(move |tuple: &$crate::tuple::Tuple| {
                    predicate($(tuple.fact::<$t>($idx)),+)
                });
                let distinct = self.node.distinct;
                Self::from_node(
                    $crate::stream::plan::StreamNode::unary(&self.node, spec, distinct),
                    self.cx,
                )
            }

            /// Keeps tuples for which at least one `Other` fact satisfies `joiner`.
            ///
            /// Facts of type `Other` are subject to the factory's nullity policy.
            pub fn if_exists<Other, J>(self, joiner: J) -> Self
            where
                Other: scoreflow_core::Fact,
                J: $crate::stream::joiner::Joiner<($($t,)+), Other>,
            {
                let right = self.cx.source::<Other>();
                self.exists_with::<Other, J>(right, joiner, true, false)
            }

            /// Keeps tuples for which no `Other` fact satisfies `joiner`.
            pub fn if_not_exists<Other, J>(self, joiner: J) -> Self
            where
                Other: scoreflow_core::Fact,
                J: $crate::stream::joiner::Joiner<($($t,)+), Other>,
            {
                let right = self.cx.source::<Other>();
                self.exists_with::<Other, J>(right, joiner, false, false)
            }

            /// Like [`if_exists`](Self::if_exists), counting `Other` facts with
            /// unassigned variables too.
            pub fn if_exists_including_null_vars<Other, J>(self, joiner: J) -> Self
            where
                Other: scoreflow_core::Fact,
                J: $crate::stream::joiner::Joiner<($($t,)+), Other>,
            {
                let right = $crate::stream::plan::StreamNode::source::<Other>(
                    scoreflow_config::NullityPolicy::IncludeUninitialized,
                );
                self.exists_with::<Other, J>(right, joiner, true, false)
            }

            pub fn if_not_exists_including_null_vars<Other, J>(self, joiner: J) -> Self
            where
                Other: scoreflow_core::Fact,
                J: $crate::stream::joiner::Joiner<($($t,)+), Other>,
            {
                let right = $crate::stream::plan::StreamNode::source::<Other>(
                    scoreflow_config::NullityPolicy::IncludeUninitialized,
                );
                self.exists_with::<Other, J>(right, joiner, false, false)
            }

            pub(crate) fn exists_with<Other, J>(
                self,
                right: std::sync::Arc<$crate::stream::plan::StreamNode>,
                joiner: J,
                should_exist: bool,
                exclude_self: bool,
            ) -> Self
            where
                Other: 'static,
                J: $crate::stream::joiner::Joiner<($($t,)+), Other>,
            {
                let spec = $crate::node::ExistsSpec::<($($t,)+), Other, J>::new(
                    joiner,
                    should_exist,
                    exclude_self,
                );
                let distinct = self.node.distinct;
                Self::from_node(
                    $crate::stream::plan::StreamNode::binary(&self.node, &right, spec, distinct),
                    self.cx,
                )
            }

            /// Maps every tuple to a single value.
            pub fn map<R, F>(self, mapping: F) -> $crate::stream::UniConstraintStream<R, Sc>
            where
                R: std::fmt::Debug + Send + Sync + 'static,
                F: Fn($(&$t),+) -> R + Send + Sync + 'static,
            {
                let spec = $crate::node::MapSpec::new(
                    move |tuple: &$crate::tuple::Tuple| -> $crate::tuple::Element {
                        std::sync::Arc::new(mapping($(tuple.fact::<$t>($idx)),+))
                    },
                );
                $crate::stream::UniConstraintStream::from_node(
                    $crate::stream::plan::StreamNode::unary(&self.node, spec, false),
                    self.cx,
                )
            }

            /// Drops tuples equal to one already passed on.
            ///
            /// A no-op on streams that already guarantee distinctness.
            pub fn distinct(self) -> Self
            where
                $($t: Eq + std::hash::Hash + Clone,)+
            {
                if self.node.distinct {
                    return self;
                }
                let spec = $crate::node::DistinctSpec::new(|tuple: &$crate::tuple::Tuple| {
                    ($(tuple.fact::<$t>($idx).clone(),)+)
                });
                Self::from_node(
                    $crate::stream::plan::StreamNode::unary(&self.node, spec, true),
                    self.cx,
                )
            }

            // ----------------------------------------------------------------
            // Group-by
            // ----------------------------------------------------------------

            fn group_node<K, KF, CS>(
                &self,
                key: KF,
                collectors: CS,
            ) -> std::sync::Arc<$crate::stream::plan::StreamNode>
            where
                K: $crate::node::GroupKey,
                KF: Fn(&$crate::tuple::Tuple) -> K + Send + Sync + 'static,
                CS: $crate::stream::collector::CollectorSet<($($t,)+)>,
            {
                let spec = $crate::node::GroupSpec::<K, KF, CS, ($($t,)+)>::new(key, collectors);
                $crate::stream::plan::StreamNode::unary(&self.node, spec, true)
            }

            /// One tuple per distinct key.
            pub fn group_by<K, KF>(self, key: KF) -> $crate::stream::UniConstraintStream<K, Sc>
            where
                K: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF: Fn($(&$t),+) -> K + Send + Sync + 'static,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| (key($(tuple.fact::<$t>($idx)),+),),
                    (),
                );
                $crate::stream::UniConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_keys<K1, K2, KF1, KF2>(
                self,
                key1: KF1,
                key2: KF2,
            ) -> $crate::stream::BiConstraintStream<K1, K2, Sc>
            where
                K1: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                K2: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF1: Fn($(&$t),+) -> K1 + Send + Sync + 'static,
                KF2: Fn($(&$t),+) -> K2 + Send + Sync + 'static,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| {
                        (
                            key1($(tuple.fact::<$t>($idx)),+),
                            key2($(tuple.fact::<$t>($idx)),+),
                        )
                    },
                    (),
                );
                $crate::stream::BiConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_keys3<K1, K2, K3, KF1, KF2, KF3>(
                self,
                key1: KF1,
                key2: KF2,
                key3: KF3,
            ) -> $crate::stream::TriConstraintStream<K1, K2, K3, Sc>
            where
                K1: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                K2: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                K3: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF1: Fn($(&$t),+) -> K1 + Send + Sync + 'static,
                KF2: Fn($(&$t),+) -> K2 + Send + Sync + 'static,
                KF3: Fn($(&$t),+) -> K3 + Send + Sync + 'static,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| {
                        (
                            key1($(tuple.fact::<$t>($idx)),+),
                            key2($(tuple.fact::<$t>($idx)),+),
                            key3($(tuple.fact::<$t>($idx)),+),
                        )
                    },
                    (),
                );
                $crate::stream::TriConstraintStream::from_node(node, self.cx)
            }

            /// A single global group folded by one collector. Emits nothing
            /// while the stream is empty.
            pub fn group_by_collect<Col>(
                self,
                collector: Col,
            ) -> $crate::stream::UniConstraintStream<Col::Result, Sc>
            where
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(|_: &$crate::tuple::Tuple| (), (collector,));
                $crate::stream::UniConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_collect2<C1, C2>(
                self,
                collector1: C1,
                collector2: C2,
            ) -> $crate::stream::BiConstraintStream<C1::Result, C2::Result, Sc>
            where
                C1: $crate::stream::collector::Collector<($($t,)+)>,
                C2: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(|_: &$crate::tuple::Tuple| (), (collector1, collector2));
                $crate::stream::BiConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_collect3<C1, C2, C3>(
                self,
                collector1: C1,
                collector2: C2,
                collector3: C3,
            ) -> $crate::stream::TriConstraintStream<C1::Result, C2::Result, C3::Result, Sc>
            where
                C1: $crate::stream::collector::Collector<($($t,)+)>,
                C2: $crate::stream::collector::Collector<($($t,)+)>,
                C3: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(
                    |_: &$crate::tuple::Tuple| (),
                    (collector1, collector2, collector3),
                );
                $crate::stream::TriConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_collect4<C1, C2, C3, C4>(
                self,
                collector1: C1,
                collector2: C2,
                collector3: C3,
                collector4: C4,
            ) -> $crate::stream::QuadConstraintStream<C1::Result, C2::Result, C3::Result, C4::Result, Sc>
            where
                C1: $crate::stream::collector::Collector<($($t,)+)>,
                C2: $crate::stream::collector::Collector<($($t,)+)>,
                C3: $crate::stream::collector::Collector<($($t,)+)>,
                C4: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(
                    |_: &$crate::tuple::Tuple| (),
                    (collector1, collector2, collector3, collector4),
                );
                $crate::stream::QuadConstraintStream::from_node(node, self.cx)
            }

            /// One `(key, result)` tuple per distinct key.
            pub fn group_by_key_collect<K, KF, Col>(
                self,
                key: KF,
                collector: Col,
            ) -> $crate::stream::BiConstraintStream<K, Col::Result, Sc>
            where
                K: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF: Fn($(&$t),+) -> K + Send + Sync + 'static,
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| (key($(tuple.fact::<$t>($idx)),+),),
                    (collector,),
                );
                $crate::stream::BiConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_key_collect2<K, KF, C1, C2>(
                self,
                key: KF,
                collector1: C1,
                collector2: C2,
            ) -> $crate::stream::TriConstraintStream<K, C1::Result, C2::Result, Sc>
            where
                K: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF: Fn($(&$t),+) -> K + Send + Sync + 'static,
                C1: $crate::stream::collector::Collector<($($t,)+)>,
                C2: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| (key($(tuple.fact::<$t>($idx)),+),),
                    (collector1, collector2),
                );
                $crate::stream::TriConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_key_collect3<K, KF, C1, C2, C3>(
                self,
                key: KF,
                collector1: C1,
                collector2: C2,
                collector3: C3,
            ) -> $crate::stream::QuadConstraintStream<K, C1::Result, C2::Result, C3::Result, Sc>
            where
                K: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF: Fn($(&$t),+) -> K + Send + Sync + 'static,
                C1: $crate::stream::collector::Collector<($($t,)+)>,
                C2: $crate::stream::collector::Collector<($($t,)+)>,
                C3: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| (key($(tuple.fact::<$t>($idx)),+),),
                    (collector1, collector2, collector3),
                );
                $crate::stream::QuadConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_keys_collect<K1, K2, KF1, KF2, Col>(
                self,
                key1: KF1,
                key2: KF2,
                collector: Col,
            ) -> $crate::stream::TriConstraintStream<K1, K2, Col::Result, Sc>
            where
                K1: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                K2: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF1: Fn($(&$t),+) -> K1 + Send + Sync + 'static,
                KF2: Fn($(&$t),+) -> K2 + Send + Sync + 'static,
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| {
                        (
                            key1($(tuple.fact::<$t>($idx)),+),
                            key2($(tuple.fact::<$t>($idx)),+),
                        )
                    },
                    (collector,),
                );
                $crate::stream::TriConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_keys_collect2<K1, K2, KF1, KF2, C1, C2>(
                self,
                key1: KF1,
                key2: KF2,
                collector1: C1,
                collector2: C2,
            ) -> $crate::stream::QuadConstraintStream<K1, K2, C1::Result, C2::Result, Sc>
            where
                K1: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                K2: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF1: Fn($(&$t),+) -> K1 + Send + Sync + 'static,
                KF2: Fn($(&$t),+) -> K2 + Send + Sync + 'static,
                C1: $crate::stream::collector::Collector<($($t,)+)>,
                C2: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| {
                        (
                            key1($(tuple.fact::<$t>($idx)),+),
                            key2($(tuple.fact::<$t>($idx)),+),
                        )
                    },
                    (collector1, collector2),
                );
                $crate::stream::QuadConstraintStream::from_node(node, self.cx)
            }

            pub fn group_by_keys3_collect<K1, K2, K3, KF1, KF2, KF3, Col>(
                self,
                key1: KF1,
                key2: KF2,
                key3: KF3,
                collector: Col,
            ) -> $crate::stream::QuadConstraintStream<K1, K2, K3, Col::Result, Sc>
            where
                K1: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                K2: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                K3: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
                KF1: Fn($(&$t),+) -> K1 + Send + Sync + 'static,
                KF2: Fn($(&$t),+) -> K2 + Send + Sync + 'static,
                KF3: Fn($(&$t),+) -> K3 + Send + Sync + 'static,
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let node = self.group_node(
                    move |tuple: &$crate::tuple::Tuple| {
                        (
                            key1($(tuple.fact::<$t>($idx)),+),
                            key2($(tuple.fact::<$t>($idx)),+),
                            key3($(tuple.fact::<$t>($idx)),+),
                        )
                    },
                    (collector,),
                );
                $crate::stream::QuadConstraintStream::from_node(node, self.cx)
            }

            // ----------------------------------------------------------------
            // Terminals
            // ----------------------------------------------------------------

            fn terminal(
                self,
                impact_type: scoreflow_core::ImpactType,
                weight: $crate::stream::ConstraintWeight<Sc>,
                weigher: $crate::stream::builder::MatchWeigher,
            ) -> $crate::stream::ConstraintBuilder<Sc> {
                $crate::stream::ConstraintBuilder::new(self.node, self.cx, impact_type, weight, weigher)
            }

            fn weigher<W>(match_weight: W) -> $crate::stream::builder::MatchWeigher
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                std::sync::Arc::new(move |tuple: &$crate::tuple::Tuple| {
                    match_weight($(tuple.fact::<$t>($idx)),+)
                })
            }

            /// Subtracts `weight` once per match.
            pub fn penalize(self, weight: Sc) -> $crate::stream::ConstraintBuilder<Sc> {
                self.terminal(
                    scoreflow_core::ImpactType::Penalty,
                    $crate::stream::ConstraintWeight::Fixed(weight),
                    $crate::stream::builder::unit_weigher(),
                )
            }

            /// Subtracts `weight * match_weight(..)` per match. The match
            /// weight must not be negative.
            pub fn penalize_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<Sc>
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                self.terminal(
                    scoreflow_core::ImpactType::Penalty,
                    $crate::stream::ConstraintWeight::Fixed(weight),
                    Self::weigher(match_weight),
                )
            }

            /// Like [`penalize`](Self::penalize), with the weight taken from
            /// the weight configuration.
            pub fn penalize_configurable(self) -> $crate::stream::ConstraintBuilder<Sc> {
                self.terminal(
                    scoreflow_core::ImpactType::Penalty,
                    $crate::stream::ConstraintWeight::Configurable,
                    $crate::stream::builder::unit_weigher(),
                )
            }

            pub fn penalize_configurable_with<W>(self, match_weight: W) -> $crate::stream::ConstraintBuilder<Sc>
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                self.terminal(
                    scoreflow_core::ImpactType::Penalty,
                    $crate::stream::ConstraintWeight::Configurable,
                    Self::weigher(match_weight),
                )
            }

            /// Adds `weight` once per match.
            pub fn reward(self, weight: Sc) -> $crate::stream::ConstraintBuilder<Sc> {
                self.terminal(
                    scoreflow_core::ImpactType::Reward,
                    $crate::stream::ConstraintWeight::Fixed(weight),
                    $crate::stream::builder::unit_weigher(),
                )
            }

            pub fn reward_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<Sc>
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                self.terminal(
                    scoreflow_core::ImpactType::Reward,
                    $crate::stream::ConstraintWeight::Fixed(weight),
                    Self::weigher(match_weight),
                )
            }

            pub fn reward_configurable(self) -> $crate::stream::ConstraintBuilder<Sc> {
                self.terminal(
                    scoreflow_core::ImpactType::Reward,
                    $crate::stream::ConstraintWeight::Configurable,
                    $crate::stream::builder::unit_weigher(),
                )
            }

            pub fn reward_configurable_with<W>(self, match_weight: W) -> $crate::stream::ConstraintBuilder<Sc>
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                self.terminal(
                    scoreflow_core::ImpactType::Reward,
                    $crate::stream::ConstraintWeight::Configurable,
                    Self::weigher(match_weight),
                )
            }

            /// Adds `weight` once per match; with `impact_with` the match
            /// weight may take either sign.
            pub fn impact(self, weight: Sc) -> $crate::stream::ConstraintBuilder<Sc> {
                self.terminal(
                    scoreflow_core::ImpactType::Mixed,
                    $crate::stream::ConstraintWeight::Fixed(weight),
                    $crate::stream::builder::unit_weigher(),
                )
            }

            pub fn impact_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<Sc>
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                self.terminal(
                    scoreflow_core::ImpactType::Mixed,
                    $crate::stream::ConstraintWeight::Fixed(weight),
                    Self::weigher(match_weight),
                )
            }

            pub fn impact_configurable(self) -> $crate::stream::ConstraintBuilder<Sc> {
                self.terminal(
                    scoreflow_core::ImpactType::Mixed,
                    $crate::stream::ConstraintWeight::Configurable,
                    $crate::stream::builder::unit_weigher(),
                )
            }

            pub fn impact_configurable_with<W>(self, match_weight: W) -> $crate::stream::ConstraintBuilder<Sc>
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                self.terminal(
                    scoreflow_core::ImpactType::Mixed,
                    $crate::stream::ConstraintWeight::Configurable,
                    Self::weigher(match_weight),
                )
            }
        }

        impl<$($t,)+ Sc: scoreflow_core::Score> Clone for $stream<$($t,)+ Sc> {
            fn clone(&self) -> Self {
                Self {
                    node: std::sync::Arc::clone(&self.node),
                    cx: std::sync::Arc::clone(&self.cx),
                    _marker: std::marker::PhantomData,
                }
            }
        }

        impl<$($t,)+ Sc: scoreflow_core::Score> std::fmt::Debug for $stream<$($t,)+ Sc> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($stream))
                    .field("node", &self.node.name())
                    .field("distinct", &self.node.distinct)
                    .finish()
            }
        }
    };
}
