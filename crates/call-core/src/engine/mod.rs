//! Engine module: pipeline, runners, validator and composer.
//!
//! Provides the build surface (`Pipeline`), the two sequential run modes
//! (`run`, `fallback`), the preflight signature validation (`check`) and
//! the branch/feed composition driven after each eligible position.

pub mod check;
pub mod compose;
pub mod pipeline;
pub mod run;

pub use pipeline::Pipeline;
pub use run::FallbackOutcome;
