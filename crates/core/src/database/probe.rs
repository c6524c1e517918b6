use async_trait::async_trait;

use crate::errors::Result;

/// Connectivity check used to decide whether the database server is up.
///
/// Implementations open (or borrow) a connection and run a trivial query.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<()>;
}
