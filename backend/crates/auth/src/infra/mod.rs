//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod notifier;
pub mod postgres;

pub use notifier::ResetMailNotifier;
pub use postgres::PgAuthRepository;
