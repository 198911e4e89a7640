//! Input state: six movement flags driven by key press/release.
//!
//! # Invariants
//! - Flags are independent; opposing directions are not exclusive.
//! - Press sets a flag, release clears it. Nothing else touches them.

pub mod movement;

pub use movement::{Movement, MovementFlags};

pub fn crate_info() -> &'static str {
    "meshview-input v0.1.0"
}
