//! Parameter set and commit policy.
//!
//! [`XfactorParams`] holds the three tunables that drive the factor
//! calculation. They are re-derived from the configuration string on load
//! and on every reconfiguration.

use super::error::ParamError;

/// Bias the host adds to every site factor so the neutral value is non-zero.
pub const NICE_OFFSET: u32 = 0x8000_0000;

/// Upper bound for [`XfactorParams::max_factor`] and [`XfactorParams::weight`].
pub const MAX_WEIGHT: u32 = NICE_OFFSET;

/// Upper bound for [`XfactorParams::min_time`], in minutes (90 days).
pub const MAX_MIN_TIME: u32 = 129_600;

/// Parameters for the expansion-factor calculation.
///
/// # Defaults
///
/// ```
/// use site_factor_xfactor::params::{XfactorParams, NICE_OFFSET};
///
/// let params = XfactorParams::default();
/// assert_eq!(params.min_time, 1);
/// assert_eq!(params.max_factor, NICE_OFFSET);
/// assert_eq!(params.weight, 1);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use site_factor_xfactor::params::XfactorParams;
///
/// let params = XfactorParams::default()
///     .with_min_time(5)
///     .with_max_factor(100)
///     .with_weight(2);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XfactorParams {
    /// Floor for a job's effective time limit, in minutes.
    ///
    /// Valid range: 1–129600.
    pub min_time: u32,

    /// Ceiling for the weighted factor.
    ///
    /// Valid range: 1–[`MAX_WEIGHT`].
    pub max_factor: u32,

    /// Multiplier applied to the raw factor.
    ///
    /// Valid range: 1–[`MAX_WEIGHT`]. A weight of 0 never comes out of the
    /// parser, but a hand-built parameter set with weight 0 disables the
    /// factor entirely.
    pub weight: u32,
}

impl Default for XfactorParams {
    fn default() -> Self {
        Self {
            min_time: 1,
            max_factor: NICE_OFFSET,
            weight: 1,
        }
    }
}

impl XfactorParams {
    /// Sets the minimum effective time limit in minutes.
    pub fn with_min_time(mut self, minutes: u32) -> Self {
        self.min_time = minutes;
        self
    }

    /// Sets the ceiling for the weighted factor.
    pub fn with_max_factor(mut self, max: u32) -> Self {
        self.max_factor = max;
        self
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Validates every field against its documented range.
    pub fn validate(&self) -> Result<(), ParamError> {
        for key in ParamKey::ALL {
            key.check(i64::from(key.get(self)))?;
        }
        Ok(())
    }
}

/// The three configuration keys, in parse order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    MinTime,
    MaxFactor,
    Weight,
}

impl ParamKey {
    /// All keys in the order the parser visits them.
    pub const ALL: [ParamKey; 3] = [ParamKey::MinTime, ParamKey::MaxFactor, ParamKey::Weight];

    /// The `key=` token searched for in the configuration string.
    pub fn token(self) -> &'static str {
        match self {
            ParamKey::MinTime => "xfactor_min_time=",
            ParamKey::MaxFactor => "xfactor_max=",
            ParamKey::Weight => "xfactor_weight=",
        }
    }

    /// Key name without the trailing `=`.
    pub fn name(self) -> &'static str {
        let token = self.token();
        &token[..token.len() - 1]
    }

    /// Inclusive valid range.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            ParamKey::MinTime => (1, MAX_MIN_TIME),
            ParamKey::MaxFactor | ParamKey::Weight => (1, MAX_WEIGHT),
        }
    }

    /// Range-checks a parsed value, returning it narrowed to `u32`.
    pub fn check(self, value: i64) -> Result<u32, ParamError> {
        let (min, max) = self.bounds();
        if value < i64::from(min) || value > i64::from(max) {
            return Err(ParamError::OutOfRange {
                key: self.name(),
                value,
                min,
                max,
            });
        }
        // In range means it fits.
        Ok(value as u32)
    }

    /// Reads this key's field from a parameter set.
    pub fn get(self, params: &XfactorParams) -> u32 {
        match self {
            ParamKey::MinTime => params.min_time,
            ParamKey::MaxFactor => params.max_factor,
            ParamKey::Weight => params.weight,
        }
    }

    /// Writes this key's field on a parameter set.
    pub fn set(self, params: &mut XfactorParams, value: u32) {
        match self {
            ParamKey::MinTime => params.min_time = value,
            ParamKey::MaxFactor => params.max_factor = value,
            ParamKey::Weight => params.weight = value,
        }
    }
}

/// How parsed values are committed to the live parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommitPolicy {
    /// Each field is committed as soon as it validates. The first missing
    /// or invalid key aborts the parse, so fields before it stay updated
    /// and fields after it keep their previous values.
    #[default]
    Incremental,

    /// Fields are staged and committed together only when all three
    /// validate. Any failure leaves the live parameters untouched.
    Atomic,
}
