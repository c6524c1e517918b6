//! Database server bootstrap.
//!
//! Runs once at startup, before the connection pool is built:
//!
//! - [`DatabaseProbe`] decides whether the server answers
//! - [`ServerControl`] runs `pg_ctl` when it does not
//! - [`DatabaseLifecycle`] sequences the two and records each state change

mod commands;
mod lifecycle;
mod probe;

pub use commands::{PgCtl, ServerControl, SERVER_LOG_FILE};
pub use lifecycle::{is_initialized, DatabaseLifecycle, LifecycleState, INIT_MARKER};
pub use probe::DatabaseProbe;
