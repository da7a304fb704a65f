//! Record lifecycle driver
//!
//! [`ValidationPipeline`] is the host side of the rule catalog: it owns the
//! registry, shares the store, runs each lifecycle point's rules in
//! declaration order and applies their effects.

mod config;
mod errors;
mod lifecycle;

pub use config::PipelineConfig;
pub use errors::{PipelineError, PipelineResult};
pub use lifecycle::ValidationPipeline;
