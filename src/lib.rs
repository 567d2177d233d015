//! Expansion-factor ("xfactor") site priority plugin for batch schedulers.
//!
//! A pending job earns a priority boost that grows with how long it has
//! been eligible to run, relative to its time limit. The host scheduler
//! supplies job records and a job list; this crate computes a bounded
//! factor and writes it into each record's site-factor field.
//!
//! - **Params**: parses the plugin's `key=value` configuration string into
//!   validated [`XfactorParams`](params::XfactorParams), with incremental
//!   or atomic commit.
//! - **Factor**: the factor formula, single-job write-back and bulk update
//!   of every pending job (optionally in parallel with rayon).
//! - **Plugin**: load, reconfigure and unload hooks around a [`Host`]
//!   collaborator that provides configuration and debug flags.
//!
//! # Architecture
//!
//! The crate owns no jobs and takes no locks. Job records, the job list and
//! their synchronization belong to the host and are reached through the
//! [`JobTiming`], [`JobRecord`] and [`JobList`] traits. Logging goes through
//! `tracing`; embedders choose the subscriber.
//!
//! [`Host`]: plugin::Host
//! [`JobTiming`]: factor::JobTiming
//! [`JobRecord`]: factor::JobRecord
//! [`JobList`]: factor::JobList

/// Human-readable plugin name.
pub const PLUGIN_NAME: &str = "xfactor site_factor plugin";

/// Plugin type in `<application>/<method>` form.
pub const PLUGIN_TYPE: &str = "site_factor/xfactor";

/// Plugin version.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod factor;
pub mod params;
pub mod plugin;

pub use factor::{FactorCalculator, Job};
pub use params::{CommitPolicy, XfactorParams, NICE_OFFSET};
pub use plugin::{Host, SiteFactorPlugin, StaticHost, XfactorPlugin};
