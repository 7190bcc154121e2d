pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod hover;
pub mod intro;
pub mod mapper;
pub mod orchestrator;
pub mod procedures;
pub mod replay;
pub mod step;

pub use config::*;
pub use context::*;
pub use controller::*;
pub use error::*;
pub use hover::*;
pub use intro::*;
pub use mapper::*;
pub use orchestrator::*;
pub use replay::*;
pub use step::*;
