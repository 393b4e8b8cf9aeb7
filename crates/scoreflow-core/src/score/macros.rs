//! Generator for level-vector score types.
//!
//! Every concrete score is a fixed list of named `i64` levels compared
//! lexicographically. `level_score!` emits the struct and everything the
//! scoring engine relies on: the `Score` and `ParseableScore` impls,
//! arithmetic, ordering, and the `Debug`/`Display` forms.
//!
//! ```ignore
//! level_score! {
//!     /// Docs for the type.
//!     HardSoftScore {
//!         hard: Hard => "hard",
//!         soft: Soft => "soft",
//!     }
//! }
//! ```
//!
//! A level with an empty suffix prints as the bare number, which is how
//! `SimpleScore` renders as `"-3"`.

macro_rules! level_score {
    (
        $(#[$meta:meta])*
        $name:ident { $($field:ident : $level:ident => $suffix:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            $($field: i64,)+
        }

        impl $name {
            const LEVELS: &'static [$crate::score::ScoreLevel] =
                &[$($crate::score::ScoreLevel::$level),+];

            pub const ZERO: $name = $name { $($field: 0,)+ };

            #[inline]
            pub const fn of($($field: i64),+) -> Self {
                $name { $($field,)+ }
            }

            $(
                #[inline]
                pub const fn $field(&self) -> i64 {
                    self.$field
                }
            )+
        }

        impl $crate::score::Score for $name {
            fn is_feasible(&self) -> bool {
                [$(self.$field),+]
                    .iter()
                    .zip(Self::LEVELS)
                    .all(|(&value, level)| *level != $crate::score::ScoreLevel::Hard || value >= 0)
            }

            #[inline]
            fn zero() -> Self {
                Self::ZERO
            }

            #[inline]
            fn levels_count() -> usize {
                Self::LEVELS.len()
            }

            fn to_level_numbers(&self) -> Vec<i64> {
                vec![$(self.$field),+]
            }

            fn from_level_numbers(levels: &[i64]) -> Self {
                let &[$($field),+] = levels else {
                    panic!(
                        "{} takes {} levels, got {}",
                        stringify!($name),
                        Self::LEVELS.len(),
                        levels.len()
                    );
                };
                Self::of($($field),+)
            }

            fn multiply(&self, multiplicand: f64) -> Self {
                Self::of($((self.$field as f64 * multiplicand).round() as i64),+)
            }

            #[inline]
            fn times(&self, multiplicand: i64) -> Self {
                Self::of($(self.$field * multiplicand),+)
            }

            fn abs(&self) -> Self {
                Self::of($(self.$field.abs()),+)
            }

            fn level_label(index: usize) -> $crate::score::ScoreLevel {
                match Self::LEVELS.get(index) {
                    Some(level) => *level,
                    None => panic!("{} has no level {}", stringify!($name), index),
                }
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                [$(self.$field),+].cmp(&[$(other.$field),+])
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $name {
            type Output = Self;

            #[inline]
            fn add(self, other: Self) -> Self {
                Self::of($(self.$field + other.$field),+)
            }
        }

        impl std::ops::Sub for $name {
            type Output = Self;

            #[inline]
            fn sub(self, other: Self) -> Self {
                Self::of($(self.$field - other.$field),+)
            }
        }

        impl std::ops::Neg for $name {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self::of($(-self.$field),+)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name))
                    $(.field(&self.$field))+
                    .finish()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&$crate::score::ParseableScore::to_string_repr(self))
            }
        }

        impl $crate::score::ParseableScore for $name {
            fn parse(text: &str) -> Result<Self, $crate::score::ScoreParseError> {
                let text = text.trim();
                let mut parts = text.split('/');
                $(
                    let $field = $crate::score::traits::parse_level(
                        stringify!($name),
                        text,
                        parts.next(),
                        $suffix,
                    )?;
                )+
                if parts.next().is_some() {
                    return Err($crate::score::ScoreParseError::new(format!(
                        "{} '{}' has more than {} levels",
                        stringify!($name),
                        text,
                        Self::LEVELS.len()
                    )));
                }
                Ok(Self::of($($field),+))
            }

            fn to_string_repr(&self) -> String {
                [$(format!("{}{}", self.$field, $suffix)),+].join("/")
            }
        }
    };
}
