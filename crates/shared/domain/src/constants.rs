//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Role of a party who accepts and performs orders (fallback role)
pub const ROLE_PLAYER: &str = "PLAYER";

/// Role of a party who creates and pays for orders
pub const ROLE_BOSS: &str = "BOSS";

/// Role of a party who approves or rejects pending orders
pub const ROLE_REVIEWER: &str = "REVIEWER";

/// Administrator role
pub const ROLE_ADMIN: &str = "ADMIN";

/// Prefix of display names generated for identities seen for the first time
pub const GENERATED_DISPLAY_NAME_PREFIX: &str = "kook_";

// =============================================================================
// Audit reasons
// =============================================================================

pub const REASON_CREATE: &str = "create";
pub const REASON_APPROVED: &str = "approved";
pub const REASON_REJECTED: &str = "rejected";
pub const REASON_ACCEPT: &str = "accept";
pub const REASON_COMPLETED: &str = "completed";

// =============================================================================
// Validation
// =============================================================================

/// Maximum length of a task description
pub const MAX_GAME_NAME_LENGTH: usize = 100;

/// Maximum length of a display name supplied by the chat layer
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Decimal places kept for order durations
pub const DURATION_SCALE: u32 = 2;

/// Total significant digits allowed for order durations, NUMERIC(6,2)
pub const DURATION_MAX_DIGITS: u32 = 6;
