//! # Pluma Core Kernel
//!
//! The kernel owns the application lifecycle: component registration,
//! ordered initialization, startup, and shutdown. The plugin engine is a
//! kernel component; the host constructs an [`Application`] once and drives
//! it, rather than reaching into a process-wide singleton.

pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use component::KernelComponent;
pub use error::{Error, Result};

// Test module declaration
#[cfg(test)]
mod tests;
