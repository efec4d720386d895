//! Numeric wire tags for the node protocol
//!
//! Request and response nodes carry independent tag spaces; both are part of
//! the host's wire contract and must not be renumbered.

pub const REQUEST_NODE_TEXT: i64 = 0;
pub const REQUEST_NODE_TOOL_RESULT: i64 = 1;
pub const REQUEST_NODE_HISTORY_SUMMARY: i64 = 10;

pub const RESPONSE_NODE_RAW_RESPONSE: i64 = 0;
pub const RESPONSE_NODE_MAIN_TEXT_FINISHED: i64 = 2;
pub const RESPONSE_NODE_TOOL_USE: i64 = 5;
pub const RESPONSE_NODE_TOOL_USE_START: i64 = 7;
pub const RESPONSE_NODE_THINKING: i64 = 8;

/// Sentinel for tags that did not parse as a finite whole number.
pub const NODE_TAG_UNKNOWN: i64 = -1;

pub const STOP_REASON_UNSPECIFIED: i32 = 0;
pub const STOP_REASON_END_TURN: i32 = 1;
pub const STOP_REASON_MAX_TOKENS: i32 = 2;
pub const STOP_REASON_TOOL_USE_REQUESTED: i32 = 3;
pub const STOP_REASON_SAFETY: i32 = 4;
pub const STOP_REASON_RECITATION: i32 = 5;
pub const STOP_REASON_MALFORMED_FUNCTION_CALL: i32 = 6;
