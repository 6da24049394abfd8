//! Canonical schema constants for structured logging
//!
//! Event names are shared by the `log_op_*` macros and the test capture
//! layer, which also looks events up by the `op` and `event` field names.

pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
