//! Quote management module.
//!
//! - [`model`] - The quote record and symbol normalization
//! - [`store`] - Storage trait implemented by the persistence crate
//! - [`service`] - Fetch-then-store service shared by the API and the scheduler
//!
//! ```text
//! QuoteService → QuoteFetcher → market-data crate (providers)
//!       ↓
//! QuoteStore (DB)
//! ```

pub mod model;
pub mod service;
pub mod store;


pub use model::{normalize_symbol, Quote};
pub use service::{QuoteService, QuoteServiceTrait, RefreshSummary};
pub use store::QuoteStore;
