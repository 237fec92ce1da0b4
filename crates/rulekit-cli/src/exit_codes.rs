//! Unified exit codes for the rulekit CLI.
//! These codes are part of the public contract.

pub const SUCCESS: i32 = 0;
pub const USAGE_ERROR: i32 = 1; // Missing or invalid command-line arguments
pub const BUILD_FAILED: i32 = 2; // Pipeline failure (discovery, staging, compile, extract)
