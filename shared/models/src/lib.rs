//! Shared data model for Chameleon data connectors.
//!
//! Sources, field descriptors and view models travel between the hosting
//! component and whichever connector it is configured with, so every type
//! here serializes to the camelCase shape the toolkit stores.

pub mod source;
pub mod query;
pub mod response;

pub use source::*;
pub use query::*;
pub use response::*;
