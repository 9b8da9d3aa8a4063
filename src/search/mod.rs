//! # Search Module
//!
//! Turns raw user input into an ordered stream of shaped search results.
//!
//! [`pipeline`] owns the orchestration: inputs are debounced so a typing
//! burst collapses into one request, consecutive duplicates are suppressed,
//! queries below the minimum length short-circuit to an empty result, and
//! responses are delivered latest-wins, so a slow response to an old query
//! can never overwrite a faster response to a newer one. A failed request
//! is reported on the stream and the pipeline keeps going.
//!
//! [`shape`] holds the pure presentation helpers the pipeline and the CLI
//! share: duration and follower-count formatting, image selection by size
//! tier, and the per-category result cap table.

pub mod pipeline;
pub mod shape;

pub use pipeline::PipelineConfig;
pub use pipeline::QueryPipeline;
pub use pipeline::SearchBackend;
pub use pipeline::SearchOutcome;
