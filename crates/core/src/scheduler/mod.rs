//! Background quote refresh.

mod refresh;
mod trading_hours;

pub use refresh::{RefreshHandle, RefreshPolicy, RefreshScheduler, TickOutcome};
pub use trading_hours::{is_trading_hours, Clock, LocalClock, TzClock};
