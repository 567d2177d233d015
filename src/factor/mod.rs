//! Expansion-factor calculation.
//!
//! A pending job's factor grows with the time it has been eligible to run,
//! measured against its time limit:
//!
//! ```text
//! factor = min(round(elapsed / max(limit, min_time)) * weight, max_factor)
//! ```
//!
//! `elapsed` is in seconds and `limit` in minutes. The value written into a
//! job record carries the host's nice offset on top.

mod engine;
mod types;

pub use engine::{
    calc_factor, calc_factor_at, effective_time_limit, encode_site_factor, unix_now,
    FactorCalculator,
};
pub use types::{
    job_limit_from_raw, partition_limit_from_raw, Job, JobList, JobRecord, JobTiming, INFINITE,
    NO_VAL,
};
