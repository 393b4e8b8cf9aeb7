//! Single-level score.

level_score! {
    /// A score with one soft level, written as a bare integer.
    ///
    /// Without a hard level every `SimpleScore` is feasible.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoreflow_core::{ParseableScore, Score, SimpleScore};
    ///
    /// let worse = SimpleScore::of(-5);
    /// let better = SimpleScore::of(-3);
    /// assert!(better > worse);
    /// assert!(worse.is_feasible());
    /// assert_eq!(SimpleScore::parse("-3").unwrap(), better);
    /// ```
    SimpleScore {
        score: Soft => "",
    }
}

impl SimpleScore {
    pub const ONE: SimpleScore = SimpleScore::of(1);
}

impl From<i64> for SimpleScore {
    fn from(score: i64) -> Self {
        SimpleScore::of(score)
    }
}
