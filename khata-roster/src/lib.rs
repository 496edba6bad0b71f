//! Organization registration and member management.
//!
//! Registration is the one pre-tenant write path: it creates the
//! organization and its first admin inside a single transaction. Everything
//! else goes through [`Roster`], which gates on the caller's session before
//! touching the tenant-scoped store.

mod error;
mod members;
mod register;
mod validate;

pub use error::{RosterError, RosterResult};
pub use members::{MemberUpdate, Roster};
pub use register::{register_organization, session_for_email, Registered, Registration};
