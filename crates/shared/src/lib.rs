pub mod config;
pub mod names;

pub use names::*;
