pub mod boundaries;
pub mod dataset;
pub mod tables;

pub use boundaries::*;
pub use dataset::*;
pub use tables::*;
