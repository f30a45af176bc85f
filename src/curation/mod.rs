//! Rating aggregation and clip list computations shared by every view.
//!
//! Everything here is pure: inputs are already-fetched clips and rating
//! records, outputs are derived lists and counters.

mod aggregate;
mod denial;
mod performance;
mod pipeline;
mod season;

pub use aggregate::*;
pub use denial::*;
pub use performance::*;
pub use pipeline::*;
pub use season::*;
