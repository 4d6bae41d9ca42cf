//! CLI Exit Code Registry
//!
//! Single source of truth for exit codes. Exit codes are part of the
//! shell contract — scripts rely on them.
//!
//! | Range | Domain    | Description                                |
//! |-------|-----------|--------------------------------------------|
//! | 0     | Universal | Success                                    |
//! | 1     | Universal | General error (unspecified)                |
//! | 2     | Universal | CLI usage error (bad args, unknown theme)  |
//! | 10-19 | review    | Upload/extraction/approval lifecycle codes |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Review (10-19)
// =============================================================================

/// Upload was rejected or never reached the backend.
pub const EXIT_UPLOAD_FAILED: u8 = 10;

/// Extraction failed on the backend (corrupt file, no invoice data).
pub const EXIT_PROCESSING_FAILED: u8 = 11;

/// Extraction did not resolve within the poll budget.
pub const EXIT_PROCESSING_TIMEOUT: u8 = 12;

/// Approval requested with the verification gate unmet.
pub const EXIT_VERIFICATION_GATE: u8 = 13;
