//! Icons used throughout the UI.

// Bead status
pub const STATUS_OPEN: &str = "○";
pub const STATUS_IN_PROGRESS: &str = "◑";
pub const STATUS_BLOCKED: &str = "⊘";
pub const STATUS_DEFERRED: &str = "◌";
pub const STATUS_CLOSED: &str = "●";
pub const STATUS_UNKNOWN: &str = "?";

// Tree markers
pub const EXPANDED: &str = "▼";
pub const COLLAPSED: &str = "▶";
pub const LEAF: &str = " ";
/// Issue that appears under more than one parent
pub const SHARED: &str = "⧉";

// Header
pub const APP: &str = "◈";
pub const SEARCH: &str = "/";
