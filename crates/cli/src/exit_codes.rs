//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                                   |
//! |------|---------------------------------------------------------------|
//! | 0    | Success                                                       |
//! | 1    | Run failed after processing started (e.g. run logs unwritable) |
//! | 2    | Configuration error (bad config file, missing/bad archive)    |
//!
//! Per-document and per-sheet problems are reported in the run summary and
//! do not change the exit code.

/// Success - all readable sheets processed and run logs written.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Configuration error - nothing was processed.
pub const EXIT_CONFIG: u8 = 2;
