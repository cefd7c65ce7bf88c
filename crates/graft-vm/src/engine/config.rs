//! Parser configuration.

/// Runtime limits for a parse run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FuelLimits {
    /// Maximum total steps (default: 1,000,000).
    pub(crate) exec_fuel: u32,
    /// Maximum rule nesting depth (default: 1,024).
    pub(crate) recursion_limit: u32,
}

impl Default for FuelLimits {
    fn default() -> Self {
        Self {
            exec_fuel: 1_000_000,
            recursion_limit: 1024,
        }
    }
}

impl FuelLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.exec_fuel = fuel;
        self
    }

    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn get_exec_fuel(&self) -> u32 {
        self.exec_fuel
    }
    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }
}

/// How loop resynchronization reports the tokens it discards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncReporting {
    /// One extraneous-input error per discarded token.
    #[default]
    EachToken,
    /// Only the first discarded token is reported.
    FirstToken,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParserConfig {
    pub limits: FuelLimits,
    pub sync_reporting: SyncReporting,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_sync_reporting(mut self, reporting: SyncReporting) -> Self {
        self.sync_reporting = reporting;
        self
    }
}
