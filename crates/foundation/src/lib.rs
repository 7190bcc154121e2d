pub mod bounds;
pub mod color;
pub mod format;
pub mod math;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use color::*;
pub use format::*;
pub use time::*;
