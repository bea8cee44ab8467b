/// Path prefix used for the root node in log and error messages
pub const ROOT_NODE_PATH: &str = "tree";
/// Only plugin location accepted in `initialize.plugins.<id>.path`
pub const BUILTIN_PLUGIN_PATH: &str = "builtin";
/// Upsampling resolution used when the time-sync config omits it (seconds)
pub const DEFAULT_UPSAMPLING_RESOLUTION: i64 = 1;
/// Field that models idle reserved capacity in padded time-sync ticks
pub const DEFAULT_TIME_RESERVED_FIELD: &str = "time-reserved";
/// Upper bound on resolution-sized ticks in one time-sync window
pub const MAX_WINDOW_TICKS: i64 = 10_000_000;
