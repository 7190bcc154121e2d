pub mod ease;
pub mod frame;
pub mod playback;
pub mod timeline;

pub use ease::*;
pub use frame::*;
pub use playback::*;
pub use timeline::*;
