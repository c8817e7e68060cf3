//! Structured logging schema and field name constants for defter.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same field names in every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, the user received the apology reply |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), notes created |
//! | DEBUG | Decision points, state transitions, config choices |
//! | TRACE | Per-item iteration, high-volume data (keywords, matched notes) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "chat", "search", "db", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "orchestrator", "ai_keywords", "gemini", "ollama", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "handle", "complete", "send", "extract", "insert"
pub const OPERATION: &str = "op";

/// Orchestrator state the event belongs to.
pub const STATE: &str = "state";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Classified command kind ("create_note", "show_last_note", "query").
pub const COMMAND: &str = "command";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a listing or filter.
pub const RESULT_COUNT: &str = "result_count";

/// Number of keywords extracted for a query.
pub const KEYWORD_COUNT: &str = "keyword_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Number of turns currently held by a chat session.
pub const HISTORY_LEN: &str = "history_len";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Error kind label (see `Error::kind`).
pub const ERROR_KIND: &str = "error_kind";

/// Whether a fallback strategy produced the result.
pub const FALLBACK: &str = "fallback";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
