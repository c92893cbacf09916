//! Chat rooms.

/// Room every participant sees.
pub const PUBLIC: &str = "public";

/// Staff-only room.
pub const ADMIN: &str = "admin";
