//! WebAssembly bindings for RouletteHash proof-of-work checks.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Computing RouletteHash of arbitrary bytes
//! - Supplying missing hash primitives from JavaScript
//! - Checking hashes and serialized headers against compact targets
//! - Computing the difficulty required for the next block

use wasm_bindgen::prelude::*;

pub mod checker;
pub mod primitives;
pub mod state;

// Re-export main types for JS access
pub use checker::PowChecker;
pub use primitives::JsPrimitives;

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
