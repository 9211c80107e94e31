//! AI components

pub mod state;


pub use state::*;
