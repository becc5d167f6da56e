pub mod net;
pub mod write;

// Re-exports for convenience
pub use net::{CanvasClient, ClientOptions, ContentFetcher, NetError, NetErrorKind};
pub use write::{ConflictSafeWriter, WriteError, WriteOutcome};
