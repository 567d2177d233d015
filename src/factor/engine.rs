//! Factor calculation and write-back.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use super::types::{JobList, JobRecord, JobTiming};
use crate::params::{XfactorParams, NICE_OFFSET};
use crate::PLUGIN_TYPE;

/// Current wall-clock time in Unix seconds. Times before the epoch read as 0.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Effective time limit in minutes used as the divisor.
///
/// The job's own limit wins, then the partition limit, then 1. The result
/// is never below `params.min_time`.
pub fn effective_time_limit<J: JobTiming + ?Sized>(params: &XfactorParams, job: &J) -> u32 {
    let limit = job
        .time_limit()
        .or_else(|| job.partition_max_time())
        .unwrap_or(1);
    limit.max(params.min_time)
}

/// Computes the weighted, clamped factor for `job` at time `now`.
///
/// Returns 0 when the weight is 0, the job has no accrue time, or no time
/// has elapsed since it. Otherwise the elapsed seconds are divided by the
/// effective time limit in minutes, rounded half away from zero,
/// multiplied by the weight and clamped to `max_factor`.
///
/// # Examples
///
/// ```
/// use site_factor_xfactor::factor::{calc_factor_at, Job};
/// use site_factor_xfactor::params::XfactorParams;
///
/// let params = XfactorParams::default()
///     .with_min_time(5)
///     .with_max_factor(100)
///     .with_weight(2);
/// let job = Job::pending(1_000).with_time_limit(10);
///
/// // 600s / 10min = 60, weighted to 120, clamped to 100
/// assert_eq!(calc_factor_at(&params, &job, 1_600), 100);
/// ```
pub fn calc_factor_at<J: JobTiming + ?Sized>(params: &XfactorParams, job: &J, now: i64) -> u32 {
    if params.weight == 0 {
        return 0;
    }
    let accrue_time = match job.accrue_time() {
        Some(t) if t != 0 => t,
        _ => return 0,
    };

    let delta = now.saturating_sub(accrue_time);
    if delta <= 0 {
        return 0;
    }

    let limit = effective_time_limit(params, job);
    // Seconds over minutes, no unit conversion.
    let raw = (delta as f64 / f64::from(limit)).round() as u64;
    let weighted = raw.saturating_mul(u64::from(params.weight));

    // Clamped to a u32 bound, so the narrowing is lossless.
    weighted.min(u64::from(params.max_factor)) as u32
}

/// [`calc_factor_at`] against the wall clock.
pub fn calc_factor<J: JobTiming + ?Sized>(params: &XfactorParams, job: &J) -> u32 {
    calc_factor_at(params, job, unix_now())
}

/// Adds the host's nice offset to a factor.
///
/// At `factor == NICE_OFFSET` the sum does not fit in `u32` and saturates.
pub fn encode_site_factor(factor: u32) -> u32 {
    factor.saturating_add(NICE_OFFSET)
}

/// Computes factors and writes them into job records.
///
/// Holds a snapshot of the parameters, so a calculator built before a
/// reconfiguration keeps using the old values.
///
/// # Examples
///
/// ```
/// use site_factor_xfactor::factor::{FactorCalculator, Job};
/// use site_factor_xfactor::params::{XfactorParams, NICE_OFFSET};
///
/// let calc = FactorCalculator::new(XfactorParams::default());
/// let mut jobs = vec![Job::pending(0), Job::running(1)];
///
/// let updated = calc.update_all_pending_at(&mut jobs, 3_600);
/// assert_eq!(updated, 1);
/// assert_eq!(jobs[0].site_factor, NICE_OFFSET);
/// assert_eq!(jobs[1].site_factor, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorCalculator {
    params: XfactorParams,
    debug: bool,
}

impl FactorCalculator {
    /// Creates a calculator with debug logging off.
    pub fn new(params: XfactorParams) -> Self {
        Self {
            params,
            debug: false,
        }
    }

    /// Enables or disables per-job debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The parameter snapshot in use.
    pub fn params(&self) -> &XfactorParams {
        &self.params
    }

    /// Factor for `job` at time `now`, without the nice offset.
    pub fn factor_at<J: JobTiming + ?Sized>(&self, job: &J, now: i64) -> u32 {
        let factor = calc_factor_at(&self.params, job, now);
        if self.debug {
            debug!(plugin = PLUGIN_TYPE, site_factor = factor, "weighted site factor");
        }
        factor
    }

    /// Factor for `job` against the wall clock, without the nice offset.
    pub fn factor<J: JobTiming + ?Sized>(&self, job: &J) -> u32 {
        self.factor_at(job, unix_now())
    }

    /// Computes and stores the site factor for one job, whatever its state.
    ///
    /// Returns the stored value (factor plus nice offset).
    pub fn set_factor_at<J: JobRecord + ?Sized>(&self, job: &mut J, now: i64) -> u32 {
        let value = encode_site_factor(self.factor_at(job, now));
        job.set_site_factor(value);
        value
    }

    /// [`set_factor_at`](Self::set_factor_at) against the wall clock.
    pub fn set_factor<J: JobRecord + ?Sized>(&self, job: &mut J) -> u32 {
        self.set_factor_at(job, unix_now())
    }

    /// Recomputes the site factor of every pending job in `jobs`.
    ///
    /// Non-pending jobs are left untouched. Returns the number of jobs
    /// updated.
    pub fn update_all_pending_at<L: JobList + ?Sized>(&self, jobs: &mut L, now: i64) -> usize {
        let mut updated = 0usize;
        jobs.for_each_job(&mut |job| {
            if job.is_pending() {
                self.set_factor_at(job, now);
                updated += 1;
            }
        });
        updated
    }

    /// [`update_all_pending_at`](Self::update_all_pending_at) against the
    /// wall clock. One timestamp is taken for the whole pass.
    pub fn update_all_pending<L: JobList + ?Sized>(&self, jobs: &mut L) -> usize {
        self.update_all_pending_at(jobs, unix_now())
    }

    /// Parallel form of [`update_all_pending_at`](Self::update_all_pending_at)
    /// over a slice, using rayon.
    #[cfg(feature = "parallel")]
    pub fn update_all_pending_par_at<J: JobRecord + Send>(
        &self,
        jobs: &mut [J],
        now: i64,
    ) -> usize {
        use rayon::prelude::*;

        jobs.par_iter_mut()
            .filter(|job| job.is_pending())
            .map(|job| {
                self.set_factor_at(job, now);
                1usize
            })
            .sum()
    }

    /// Parallel form of [`update_all_pending`](Self::update_all_pending).
    #[cfg(feature = "parallel")]
    pub fn update_all_pending_par<J: JobRecord + Send>(&self, jobs: &mut [J]) -> usize {
        self.update_all_pending_par_at(jobs, unix_now())
    }
}
