//! Two-level score: hard constraints decide feasibility, soft ones rank
//! feasible solutions.

level_score! {
    /// A score with a hard and a soft level.
    ///
    /// The soft level is only compared when hard levels are equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoreflow_core::{HardSoftScore, ParseableScore, Score};
    ///
    /// let broken = HardSoftScore::of(-1, -100);
    /// let feasible = HardSoftScore::of(0, -200);
    /// assert!(feasible > broken);
    /// assert!(!broken.is_feasible());
    /// assert_eq!(feasible.to_string(), "0hard/-200soft");
    /// assert_eq!(HardSoftScore::parse("0hard/-200soft").unwrap(), feasible);
    /// ```
    HardSoftScore {
        hard: Hard => "hard",
        soft: Soft => "soft",
    }
}

impl HardSoftScore {
    pub const ONE_HARD: HardSoftScore = HardSoftScore::of(1, 0);

    pub const ONE_SOFT: HardSoftScore = HardSoftScore::of(0, 1);

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore::of(hard, 0)
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore::of(0, soft)
    }
}
