//! AI systems (FixedUpdate)

pub mod death;
pub mod tick;

pub use death::*;
pub use tick::*;
