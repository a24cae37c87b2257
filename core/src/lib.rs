//! # Auriga Engine Core
//!
//! Core crate for the Auriga engine: math types, the scoped worker pool,
//! and CPU-side sampler definitions shared with the graphics crate.

pub mod math;
pub mod pool;
pub mod sampler;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the core subsystem.
pub fn init() {
    log::info!("Auriga Core v{} initialized", VERSION);
}
