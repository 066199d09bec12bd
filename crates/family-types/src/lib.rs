//! Wire types shared by the API server, the stores and the client.

pub mod api;
pub mod models;
pub mod validation;

/// Role assigned to every account created through registration.
pub const DEFAULT_ROLE: &str = "user";

/// Role that may list every account across families.
pub const ADMIN_ROLE: &str = "administrator";
