//! Exit codes for CLI operations
//!
//! A check that ran to completion and did not hold exits with
//! [`VERDICT_FALSE`]; every other failure class has its own code so scenario
//! runners can tell a broken descriptor from a broken cluster.

/// The check held
pub const SUCCESS: i32 = 0;

/// The check ran and did not hold
pub const VERDICT_FALSE: i32 = 1;

/// Descriptor missing or unreadable, or a component lacks a required field
pub const CONFIGURATION_ERROR: i32 = 2;

/// Alias matched no component or several
pub const RESOLUTION_ERROR: i32 = 3;

/// Cluster output did not allow a decision
pub const INDETERMINATE: i32 = 4;

/// kubectl failed or could not be started
pub const COMMAND_ERROR: i32 = 5;

/// Unknown or unimplemented condition, action or property
pub const UNSUPPORTED: i32 = 6;

/// Internal error (following sysexits.h EX_SOFTWARE)
pub const INTERNAL_ERROR: i32 = 70;
