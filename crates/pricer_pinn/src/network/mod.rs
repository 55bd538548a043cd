//! The neural approximator and its layer description.

mod architecture;
mod model;

pub use architecture::{Architecture, DEFAULT_LAYERS};
pub use model::PinnNetwork;
