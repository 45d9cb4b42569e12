//! Developer tooling: read-only inspectors used by the desktop HUD and the CLI.
//!
//! # Invariants
//! - Inspectors never mutate the state they read.

mod inspector;

pub use inspector::{FrameInspector, FrameSummary, TerrainSummary};

pub fn crate_info() -> &'static str {
    "realm-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
