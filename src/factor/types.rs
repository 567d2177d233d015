//! Host-facing job traits.
//!
//! The host owns job records and the job list. The calculator sees a job
//! only through [`JobTiming`] and writes back through [`JobRecord`], and it
//! walks the list through the [`JobList`] visitor.

/// Host sentinel for an unset time limit.
pub const NO_VAL: u32 = 0xffff_fffe;

/// Host sentinel for an unbounded partition time limit.
pub const INFINITE: u32 = 0xffff_ffff;

/// Read-only timing facts for one job.
pub trait JobTiming {
    /// Unix timestamp (seconds) from which the job accrues eligibility.
    ///
    /// `None` when the job has no detail record. `Some(0)` means the job
    /// is not eligible yet.
    fn accrue_time(&self) -> Option<i64>;

    /// Requested time limit in minutes, `None` when unset (`NO_VAL`).
    ///
    /// An `INFINITE` job limit is a set limit and is used as the divisor.
    fn time_limit(&self) -> Option<u32>;

    /// Time limit of the owning partition in minutes, `None` when the
    /// partition is unbounded (`INFINITE`) or unknown.
    fn partition_max_time(&self) -> Option<u32>;

    /// Whether the job is queued and not yet running.
    fn is_pending(&self) -> bool;
}

/// A job record with a writable site-factor field.
pub trait JobRecord: JobTiming {
    /// Current site factor, including the nice offset.
    fn site_factor(&self) -> u32;

    /// Stores a site factor. The value already includes the nice offset.
    fn set_site_factor(&mut self, value: u32);
}

/// Visitor over every job the host knows about.
///
/// Implemented for slices and `Vec`s of records; hosts with their own
/// collection implement it over whatever locking they already hold.
pub trait JobList {
    /// The record type handed to the visitor.
    type Job: JobRecord;

    /// Calls `visit` once for each job, in any order.
    fn for_each_job(&mut self, visit: &mut dyn FnMut(&mut Self::Job));
}

impl<J: JobRecord> JobList for [J] {
    type Job = J;

    fn for_each_job(&mut self, visit: &mut dyn FnMut(&mut J)) {
        for job in self.iter_mut() {
            visit(job);
        }
    }
}

impl<J: JobRecord> JobList for Vec<J> {
    type Job = J;

    fn for_each_job(&mut self, visit: &mut dyn FnMut(&mut J)) {
        self.as_mut_slice().for_each_job(visit);
    }
}

/// Maps a raw job time limit to `None` when it is `NO_VAL`.
pub fn job_limit_from_raw(raw: u32) -> Option<u32> {
    (raw != NO_VAL).then_some(raw)
}

/// Maps a raw partition time limit to `None` when it is `INFINITE`.
pub fn partition_limit_from_raw(raw: u32) -> Option<u32> {
    (raw != INFINITE).then_some(raw)
}

/// Plain job record for hosts that copy their state out, and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Job {
    /// See [`JobTiming::accrue_time`].
    pub accrue_time: Option<i64>,
    /// See [`JobTiming::time_limit`].
    pub time_limit: Option<u32>,
    /// See [`JobTiming::partition_max_time`].
    pub partition_max_time: Option<u32>,
    /// See [`JobTiming::is_pending`].
    pub pending: bool,
    /// Site factor including the nice offset.
    pub site_factor: u32,
}

impl Job {
    /// A pending job that started accruing at `accrue_time`.
    pub fn pending(accrue_time: i64) -> Self {
        Self {
            accrue_time: Some(accrue_time),
            pending: true,
            ..Self::default()
        }
    }

    /// A running job that started accruing at `accrue_time`.
    pub fn running(accrue_time: i64) -> Self {
        Self {
            accrue_time: Some(accrue_time),
            pending: false,
            ..Self::default()
        }
    }

    /// Builds a record from raw host fields. Only `NO_VAL` unsets the job
    /// limit and only `INFINITE` unbounds the partition limit; any other
    /// value, including the other sentinel, is taken as minutes.
    pub fn from_raw(
        accrue_time: i64,
        time_limit: u32,
        partition_max_time: u32,
        pending: bool,
    ) -> Self {
        Self {
            accrue_time: Some(accrue_time),
            time_limit: job_limit_from_raw(time_limit),
            partition_max_time: partition_limit_from_raw(partition_max_time),
            pending,
            site_factor: 0,
        }
    }

    /// Sets the requested time limit in minutes.
    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.time_limit = Some(minutes);
        self
    }

    /// Sets the partition time limit in minutes.
    pub fn with_partition_max_time(mut self, minutes: u32) -> Self {
        self.partition_max_time = Some(minutes);
        self
    }
}

impl JobTiming for Job {
    fn accrue_time(&self) -> Option<i64> {
        self.accrue_time
    }

    fn time_limit(&self) -> Option<u32> {
        self.time_limit
    }

    fn partition_max_time(&self) -> Option<u32> {
        self.partition_max_time
    }

    fn is_pending(&self) -> bool {
        self.pending
    }
}

impl JobRecord for Job {
    fn site_factor(&self) -> u32 {
        self.site_factor
    }

    fn set_site_factor(&mut self, value: u32) {
        self.site_factor = value;
    }
}
