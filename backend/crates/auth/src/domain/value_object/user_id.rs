//! Account identifier
//!
//! The kernel's typed UUID. Access token `sub` claims and `/admin/users/{id}`
//! paths carry its hyphenated string form.

pub use kernel::id::UserId;
