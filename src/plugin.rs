//! Plugin lifecycle: load, reconfigure, score, unload.
//!
//! [`XfactorPlugin`] owns the live parameter set and reads configuration
//! from the host through the [`Host`] trait. Configuration problems are
//! logged and never surface as failures; the plugin keeps scoring with the
//! last good parameters (or the built-in defaults).

use tracing::{debug, error};

use crate::factor::{FactorCalculator, JobList, JobRecord};
use crate::params::{self, CommitPolicy, ParseReport, XfactorParams};

pub use crate::{PLUGIN_NAME, PLUGIN_TYPE, PLUGIN_VERSION};

/// Host debug flag bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DebugFlags(pub u64);

impl DebugFlags {
    /// No flags set.
    pub const NONE: DebugFlags = DebugFlags(0);

    /// Priority-calculation diagnostics.
    pub const PRIORITY: DebugFlags = DebugFlags(1 << 6);

    /// Returns `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: DebugFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for DebugFlags {
    type Output = DebugFlags;

    fn bitor(self, rhs: DebugFlags) -> DebugFlags {
        DebugFlags(self.0 | rhs.0)
    }
}

/// What the plugin needs from the host scheduler.
pub trait Host {
    /// The plugin's configuration string, `None` if the host has none.
    fn configuration_string(&self) -> Option<String>;

    /// Current debug flags.
    fn debug_flags(&self) -> DebugFlags;
}

impl<H: Host + ?Sized> Host for &H {
    fn configuration_string(&self) -> Option<String> {
        (**self).configuration_string()
    }

    fn debug_flags(&self) -> DebugFlags {
        (**self).debug_flags()
    }
}

/// A host backed by fixed values.
///
/// # Examples
///
/// ```
/// use site_factor_xfactor::plugin::{StaticHost, XfactorPlugin};
///
/// let host = StaticHost::new("xfactor_min_time=5,xfactor_max=100,xfactor_weight=2");
/// let plugin = XfactorPlugin::init(host);
/// assert_eq!(plugin.params().weight, 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHost {
    /// Configuration string handed to the plugin.
    pub parameters: Option<String>,
    /// Debug flags handed to the plugin.
    pub debug_flags: DebugFlags,
}

impl StaticHost {
    /// A host with the given configuration string and no debug flags.
    pub fn new(parameters: impl Into<String>) -> Self {
        Self {
            parameters: Some(parameters.into()),
            debug_flags: DebugFlags::NONE,
        }
    }

    /// A host with no configuration string.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Sets the debug flags.
    pub fn with_debug_flags(mut self, flags: DebugFlags) -> Self {
        self.debug_flags = flags;
        self
    }
}

impl Host for StaticHost {
    fn configuration_string(&self) -> Option<String> {
        self.parameters.clone()
    }

    fn debug_flags(&self) -> DebugFlags {
        self.debug_flags
    }
}

/// Operations a host scheduler calls on a site-factor plugin.
pub trait SiteFactorPlugin {
    /// Plugin type string, e.g. `site_factor/xfactor`.
    fn plugin_type(&self) -> &str;

    /// Re-reads configuration after the host reloads its own.
    fn reconfig(&mut self);

    /// Computes and stores the site factor of one job.
    fn set<J: JobRecord + ?Sized>(&self, job: &mut J);

    /// Recomputes the site factor of every pending job.
    fn update<L: JobList + ?Sized>(&self, jobs: &mut L);
}

/// The xfactor site-factor plugin.
///
/// Loading never fails: [`init`](Self::init) parses the configuration,
/// logs any problem and falls back to the built-in defaults.
#[derive(Debug, Clone)]
pub struct XfactorPlugin<H: Host> {
    host: H,
    params: XfactorParams,
    policy: CommitPolicy,
}

impl<H: Host> XfactorPlugin<H> {
    /// Load hook. Parses configuration with [`CommitPolicy::Incremental`].
    pub fn init(host: H) -> Self {
        Self::init_with_policy(host, CommitPolicy::default())
    }

    /// Load hook with an explicit commit policy.
    pub fn init_with_policy(host: H, policy: CommitPolicy) -> Self {
        debug!(plugin = PLUGIN_NAME, "loaded");
        let mut plugin = Self {
            host,
            params: XfactorParams::default(),
            policy,
        };
        plugin.parse_parameters();
        plugin
    }

    /// Unload hook. Hands the host back.
    pub fn fini(self) -> H {
        debug!(plugin = PLUGIN_NAME, "unloading");
        self.host
    }

    /// Re-parses configuration. Same semantics as the load-time parse.
    pub fn reconfig(&mut self) -> ParseReport {
        self.parse_parameters()
    }

    /// Parameters currently in force.
    pub fn params(&self) -> &XfactorParams {
        &self.params
    }

    /// Commit policy used on (re)load.
    pub fn commit_policy(&self) -> CommitPolicy {
        self.policy
    }

    /// The host collaborator.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to change its configuration
    /// before a [`reconfig`](Self::reconfig).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// A calculator over the current parameter snapshot.
    pub fn calculator(&self) -> FactorCalculator {
        FactorCalculator::new(self.params).with_debug(self.priority_debug())
    }

    /// Computes and stores the site factor for one job, whatever its
    /// state. Returns the stored value.
    pub fn set_factor<J: JobRecord + ?Sized>(&self, job: &mut J) -> u32 {
        self.calculator().set_factor(job)
    }

    /// Recomputes the site factor of every pending job in `jobs`.
    /// Returns the number of jobs updated.
    pub fn update_all_pending<L: JobList + ?Sized>(&self, jobs: &mut L) -> usize {
        self.calculator().update_all_pending(jobs)
    }

    /// Parallel form of [`update_all_pending`](Self::update_all_pending).
    #[cfg(feature = "parallel")]
    pub fn update_all_pending_par<J: JobRecord + Send>(&self, jobs: &mut [J]) -> usize {
        self.calculator().update_all_pending_par(jobs)
    }

    fn priority_debug(&self) -> bool {
        self.host.debug_flags().contains(DebugFlags::PRIORITY)
    }

    fn parse_parameters(&mut self) -> ParseReport {
        let source = self.host.configuration_string();
        let report = params::parse(&mut self.params, source.as_deref(), self.policy);

        if let Some(err) = report.error() {
            error!(plugin = PLUGIN_TYPE, "{err}");
        }
        if self.priority_debug() {
            debug!(
                plugin = PLUGIN_TYPE,
                xfactor_min_time = self.params.min_time,
                xfactor_max = self.params.max_factor,
                xfactor_weight = self.params.weight,
                "site factor parameters"
            );
        }
        report
    }
}

impl<H: Host> SiteFactorPlugin for XfactorPlugin<H> {
    fn plugin_type(&self) -> &str {
        PLUGIN_TYPE
    }

    fn reconfig(&mut self) {
        XfactorPlugin::reconfig(self);
    }

    fn set<J: JobRecord + ?Sized>(&self, job: &mut J) {
        self.set_factor(job);
    }

    fn update<L: JobList + ?Sized>(&self, jobs: &mut L) {
        self.update_all_pending(jobs);
    }
}
