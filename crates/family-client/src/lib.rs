//! Client for the family organiser API: a typed HTTP client, the locally
//! persisted session, and the dashboard's filtering and rendering.

pub mod client;
pub mod dashboard;
pub mod error;
pub mod session;

pub use client::FamilyClient;
pub use error::ClientError;
pub use session::{Session, SessionStore};
