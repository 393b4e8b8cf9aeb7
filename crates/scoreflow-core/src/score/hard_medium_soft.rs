//! Three-level score with a medium level between hard and soft.

level_score! {
    /// A score with hard, medium and soft levels, compared in that order.
    ///
    /// Medium is typically used for "assign as much as possible" style
    /// goals that must outrank every soft preference.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoreflow_core::HardMediumSoftScore;
    ///
    /// let fewer_gaps = HardMediumSoftScore::of(0, -5, -200);
    /// let cheaper = HardMediumSoftScore::of(0, -10, -100);
    /// assert!(fewer_gaps > cheaper);
    /// assert_eq!(cheaper.to_string(), "0hard/-10medium/-100soft");
    /// ```
    HardMediumSoftScore {
        hard: Hard => "hard",
        medium: Medium => "medium",
        soft: Soft => "soft",
    }
}

impl HardMediumSoftScore {
    pub const ONE_HARD: HardMediumSoftScore = HardMediumSoftScore::of(1, 0, 0);

    pub const ONE_MEDIUM: HardMediumSoftScore = HardMediumSoftScore::of(0, 1, 0);

    pub const ONE_SOFT: HardMediumSoftScore = HardMediumSoftScore::of(0, 0, 1);

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardMediumSoftScore::of(hard, 0, 0)
    }

    #[inline]
    pub const fn of_medium(medium: i64) -> Self {
        HardMediumSoftScore::of(0, medium, 0)
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardMediumSoftScore::of(0, 0, soft)
    }
}
