//! `.modinfo` document model and XML rendering.
//!
//! A `.modinfo` tells the game what files a mod ships, what to do with them,
//! and how the mod relates to other mods and DLC.

pub mod schema;
pub mod xml;

pub use schema::*;
pub use xml::*;
