//! Configuration string parsing.
//!
//! Keys are located by case-insensitive substring search, and the value
//! after each key is read as a leading decimal integer: whitespace and one
//! sign are accepted, parsing stops at the first non-digit, and input with
//! no digits reads as 0.

use super::config::{CommitPolicy, ParamKey, XfactorParams};
use super::error::ParamError;

/// Outcome of one parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    /// Parameters in force after the call.
    pub params: XfactorParams,

    /// First failure encountered, if any. Parsing stops there.
    pub error: Option<ParamError>,
}

impl ParseReport {
    /// Returns `true` if every key was found and valid.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&ParamError> {
        self.error.as_ref()
    }
}

/// Parses `source` into `params` under the given commit policy.
///
/// `source` is `None` when the host has no configuration string; the
/// parameters are then left as they are.
///
/// With [`CommitPolicy::Incremental`] each key is committed as soon as it
/// validates, in the order `xfactor_min_time`, `xfactor_max`,
/// `xfactor_weight`, and the first failure skips the remaining keys. With
/// [`CommitPolicy::Atomic`] nothing is committed unless all three pass.
///
/// # Examples
///
/// ```
/// use site_factor_xfactor::params::{parse, CommitPolicy, XfactorParams};
///
/// let mut params = XfactorParams::default();
/// let report = parse(
///     &mut params,
///     Some("xfactor_min_time=5,xfactor_max=100,xfactor_weight=2"),
///     CommitPolicy::Incremental,
/// );
/// assert!(report.is_ok());
/// assert_eq!(params.max_factor, 100);
/// ```
pub fn parse(
    params: &mut XfactorParams,
    source: Option<&str>,
    policy: CommitPolicy,
) -> ParseReport {
    let Some(source) = source else {
        return ParseReport {
            params: *params,
            error: Some(ParamError::NotSet),
        };
    };

    let result = match policy {
        CommitPolicy::Incremental => apply(params, source),
        CommitPolicy::Atomic => {
            let mut staged = *params;
            apply(&mut staged, source).map(|()| *params = staged)
        }
    };

    ParseReport {
        params: *params,
        error: result.err(),
    }
}

fn apply(params: &mut XfactorParams, source: &str) -> Result<(), ParamError> {
    for key in ParamKey::ALL {
        let value = read_key(source, key)?;
        key.set(params, value);
    }
    Ok(())
}

/// Looks up one key and range-checks its value.
pub fn read_key(source: &str, key: ParamKey) -> Result<u32, ParamError> {
    let rest = find_key(source, key.token())
        .ok_or(ParamError::MissingKey { key: key.name() })?;
    key.check(leading_int(rest))
}

/// Returns the bytes following the first case-insensitive occurrence of
/// `token` in `haystack`.
pub fn find_key<'a>(haystack: &'a str, token: &str) -> Option<&'a [u8]> {
    let hay = haystack.as_bytes();
    let needle = token.as_bytes();
    if needle.is_empty() {
        return Some(hay);
    }
    hay.windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|start| &hay[start + needle.len()..])
}

/// Reads a leading decimal integer.
///
/// Digit runs too long for `i64` saturate; the range check downstream
/// rejects them either way.
pub fn leading_int(bytes: &[u8]) -> i64 {
    let mut rest = bytes;
    while let [b, tail @ ..] = rest {
        if b.is_ascii_whitespace() || *b == 0x0b {
            rest = tail;
        } else {
            break;
        }
    }

    let negative = match rest {
        [b'-', tail @ ..] => {
            rest = tail;
            true
        }
        [b'+', tail @ ..] => {
            rest = tail;
            false
        }
        _ => false,
    };

    let magnitude = rest
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::config::{MAX_MIN_TIME, MAX_WEIGHT, NICE_OFFSET};

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int(b"42"), 42);
        assert_eq!(leading_int(b"42,xfactor_max=7"), 42);
        assert_eq!(leading_int(b"  17 "), 17);
        assert_eq!(leading_int(b"+8"), 8);
        assert_eq!(leading_int(b"-3"), -3);
        assert_eq!(leading_int(b"abc"), 0);
        assert_eq!(leading_int(b""), 0);
        assert_eq!(leading_int(b"12abc34"), 12);
        assert_eq!(leading_int(b"99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_find_key_case_insensitive() {
        let rest = find_key("Foo=1 XFACTOR_MAX=20", "xfactor_max=").unwrap();
        assert_eq!(rest, b"20");
        assert!(find_key("xfactor_weight=1", "xfactor_max=").is_none());
    }

    #[test]
    fn test_find_key_first_occurrence() {
        let rest = find_key("xfactor_max=1 xfactor_max=2", "xfactor_max=").unwrap();
        assert_eq!(leading_int(rest), 1);
    }

    #[test]
    fn test_find_key_after_multibyte() {
        let rest = find_key("héllo xfactor_max=9", "xfactor_max=").unwrap();
        assert_eq!(leading_int(rest), 9);
    }

    #[test]
    fn test_parse_all_keys() {
        let mut params = XfactorParams::default();
        let report = parse(
            &mut params,
            Some("xfactor_min_time=5,xfactor_max=100,xfactor_weight=2"),
            CommitPolicy::Incremental,
        );
        assert!(report.is_ok());
        assert_eq!(
            params,
            XfactorParams {
                min_time: 5,
                max_factor: 100,
                weight: 2,
            }
        );
        assert_eq!(report.params, params);
    }

    #[test]
    fn test_parse_any_order_and_delimiters() {
        let mut params = XfactorParams::default();
        let report = parse(
            &mut params,
            Some("XFactor_Weight=3 other=1;xfactor_max=50\txfactor_MIN_time=10"),
            CommitPolicy::Incremental,
        );
        assert!(report.is_ok());
        assert_eq!(params.min_time, 10);
        assert_eq!(params.max_factor, 50);
        assert_eq!(params.weight, 3);
    }

    #[test]
    fn test_parse_bounds_inclusive() {
        let mut params = XfactorParams::default();
        let source = format!(
            "xfactor_min_time={MAX_MIN_TIME},xfactor_max={MAX_WEIGHT},xfactor_weight=1"
        );
        let report = parse(&mut params, Some(&source), CommitPolicy::Incremental);
        assert!(report.is_ok());
        assert_eq!(params.min_time, MAX_MIN_TIME);
        assert_eq!(params.max_factor, NICE_OFFSET);
    }

    #[test]
    fn test_parse_not_set() {
        let before = XfactorParams::default().with_weight(9);
        let mut params = before;
        let report = parse(&mut params, None, CommitPolicy::Incremental);
        assert_eq!(report.error(), Some(&ParamError::NotSet));
        assert_eq!(params, before);
    }

    #[test]
    fn test_parse_missing_weight_incremental() {
        let mut params = XfactorParams::default().with_weight(7);
        let report = parse(
            &mut params,
            Some("xfactor_min_time=5 xfactor_max=100"),
            CommitPolicy::Incremental,
        );
        assert_eq!(
            report.error(),
            Some(&ParamError::MissingKey {
                key: "xfactor_weight"
            })
        );
        assert_eq!(params.min_time, 5);
        assert_eq!(params.max_factor, 100);
        assert_eq!(params.weight, 7);
    }

    #[test]
    fn test_parse_missing_weight_atomic() {
        let before = XfactorParams::default().with_weight(7);
        let mut params = before;
        let report = parse(
            &mut params,
            Some("xfactor_min_time=5 xfactor_max=100"),
            CommitPolicy::Atomic,
        );
        assert!(!report.is_ok());
        assert_eq!(params, before);
        assert_eq!(report.params, before);
    }

    #[test]
    fn test_parse_invalid_min_time_skips_rest() {
        let before = XfactorParams::default();
        let mut params = before;
        let report = parse(
            &mut params,
            Some("xfactor_min_time=0 xfactor_max=100 xfactor_weight=2"),
            CommitPolicy::Incremental,
        );
        assert_eq!(report.error().and_then(ParamError::key), Some("xfactor_min_time"));
        assert_eq!(params, before);
    }

    #[test]
    fn test_parse_invalid_max_keeps_min_time() {
        let mut params = XfactorParams::default();
        let report = parse(
            &mut params,
            Some("xfactor_min_time=60 xfactor_max=0 xfactor_weight=2"),
            CommitPolicy::Incremental,
        );
        assert!(matches!(
            report.error(),
            Some(ParamError::OutOfRange {
                key: "xfactor_max",
                value: 0,
                ..
            })
        ));
        assert_eq!(params.min_time, 60);
        assert_eq!(params.max_factor, NICE_OFFSET);
        assert_eq!(params.weight, 1);
    }

    #[test]
    fn test_parse_non_numeric_is_out_of_range() {
        let mut params = XfactorParams::default();
        let report = parse(
            &mut params,
            Some("xfactor_min_time=abc xfactor_max=1 xfactor_weight=1"),
            CommitPolicy::Incremental,
        );
        assert!(matches!(
            report.error(),
            Some(ParamError::OutOfRange { value: 0, .. })
        ));
    }

    #[test]
    fn test_parse_negative_rejected() {
        let mut params = XfactorParams::default();
        let report = parse(
            &mut params,
            Some("xfactor_min_time=5 xfactor_max=10 xfactor_weight=-3"),
            CommitPolicy::Atomic,
        );
        assert!(matches!(
            report.error(),
            Some(ParamError::OutOfRange { value: -3, .. })
        ));
        assert_eq!(params, XfactorParams::default());
    }

    #[test]
    fn test_parse_trailing_garbage_ignored() {
        let mut params = XfactorParams::default();
        let report = parse(
            &mut params,
            Some("xfactor_min_time=5min,xfactor_max=100x,xfactor_weight=2.5"),
            CommitPolicy::Incremental,
        );
        assert!(report.is_ok());
        assert_eq!(params.min_time, 5);
        assert_eq!(params.max_factor, 100);
        assert_eq!(params.weight, 2);
    }

    #[test]
    fn test_read_key() {
        assert_eq!(read_key("xfactor_weight=4", ParamKey::Weight), Ok(4));
        assert_eq!(
            read_key("", ParamKey::MinTime),
            Err(ParamError::MissingKey {
                key: "xfactor_min_time"
            })
        );
    }
}
