//! ─── Atlock Protocol Constants ──────────────────────────────────────────────

/// Minimum safety margin between the two escrows' timelocks, absent an
/// explicit `safety_margin_ms` override (§3.5).
pub const DEFAULT_SAFETY_MARGIN_MS: u64 = 5 * 60 * 1000;

/// Default confirmation threshold before a write is treated as included.
pub const DEFAULT_CONFIRMATIONS: u32 = 1;

/// Default retry policy.
pub const DEFAULT_MAX_RETRIES: u32 = 8;
pub const DEFAULT_RETRY_INITIAL_BACKOFF_MS: u64 = 500;
pub const DEFAULT_RETRY_MAX_BACKOFF_MS: u64 = 60_000;

/// How long a terminal order is kept in the record store before GC.
pub const DEFAULT_ORDER_RETENTION_MS: u64 = 7 * 24 * 3600 * 1000;

/// Current on-disk record schema version.
pub const CURRENT_SCHEMA_VERSION: u16 = 1;
