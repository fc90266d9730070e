//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_ATTEMPT_ID: &str = "attempt_id";

// Storage identifiers
pub const FIELD_ROOT: &str = "root";
pub const FIELD_CANDIDATE: &str = "candidate";
pub const FIELD_FILE: &str = "file";

// Collection sizes
pub const FIELD_FILES_COPIED: &str = "files_copied";
pub const FIELD_FILES_FAILED: &str = "files_failed";
pub const FIELD_INGREDIENT_COUNT: &str = "ingredient_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_DEGRADED: &str = "degraded";
