//! Runtime bridge between built mods and the game's scripting environment.
//! Keep this crate free of filesystem and build-pipeline concerns.

pub mod diagnostics;
pub mod loader;
pub mod namespace;
pub mod registry;
pub mod resource;

pub use diagnostics::*;
pub use loader::*;
pub use namespace::*;
pub use registry::*;
pub use resource::*;
