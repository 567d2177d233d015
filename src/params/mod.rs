//! Configuration parsing for the xfactor parameters.
//!
//! The host hands over one flat string holding `key=value` tokens:
//!
//! - `xfactor_min_time=<minutes>`: floor for a job's effective time limit
//! - `xfactor_max=<n>`: ceiling for the weighted factor
//! - `xfactor_weight=<n>`: multiplier applied to the raw factor
//!
//! Keys are matched case-insensitively anywhere in the string, so any
//! delimiter works. All three are required for a reload to take full
//! effect; how a partial reload is committed depends on [`CommitPolicy`].

mod config;
mod error;
mod parser;

pub use config::{
    CommitPolicy, ParamKey, XfactorParams, MAX_MIN_TIME, MAX_WEIGHT, NICE_OFFSET,
};
pub use error::ParamError;
pub use parser::{find_key, leading_int, parse, read_key, ParseReport};
