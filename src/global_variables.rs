// Timing (all values in logical time-units)
pub const YELLOW_DURATION: u64 = 2;
pub const RED_DURATION: u64 = 1;
pub const ROUND_ROBIN_PERIOD: u64 = 5;
pub const PAIRED_CYCLE_PERIOD: u64 = 6;

// Wall-clock length of one time-unit for the real-time loop
pub const TICK_MILLIS: u64 = 1000;

// Config
pub const CONFIG_ENV_VAR: &str = "INTERSECTION_CONFIG";

// Log Files
pub const SIGNAL_LOG_CSV: &str = "signal_log.csv";
