/// Classification for retry policy.
///
/// Used by the quote fetcher to decide whether a failed provider call is
/// worth repeating.
///
/// | Class | Retried? |
/// |-------|----------|
/// | `Never` | No |
/// | `WithBackoff` | Yes, up to the configured attempt budget |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad symbol, malformed payload, or cancellation.
    /// The request is fundamentally invalid and retrying won't help.
    Never,

    /// Retry with exponential backoff.
    ///
    /// Used for transient errors like transport failures, timeouts,
    /// rate limiting (429) and provider-side 5xx responses.
    WithBackoff,
}
