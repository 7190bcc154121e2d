pub mod chart;
pub mod geometry_store;
pub mod path;
pub mod scale;
pub mod symbology;

pub use chart::*;
pub use geometry_store::*;
pub use path::*;
pub use scale::*;
pub use symbology::*;
