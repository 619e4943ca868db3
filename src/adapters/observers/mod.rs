//! Action Observer Adapters.
//!
//! - `TracingObserver` - Forwards renderings to `tracing`
//! - `RecordingObserver` - Keeps renderings in memory

mod recording_observer;
mod tracing_observer;

pub use recording_observer::RecordingObserver;
pub use tracing_observer::TracingObserver;
