pub mod surface;
pub mod target;
pub mod value;

pub use surface::*;
pub use target::*;
pub use value::*;
