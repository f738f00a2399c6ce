//! Shared types for the Toolboard tool-call engine.

mod group;
mod message;
mod metadata;
mod record;
mod view;

pub use group::*;
pub use message::*;
pub use metadata::*;
pub use record::*;
pub use view::*;
