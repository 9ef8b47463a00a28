#![forbid(unsafe_code)]

mod analytics;
mod candidates;
mod memory;
mod normalize;
mod repository;
mod resolve;
mod similarity;
mod types;

pub use analytics::*;
pub use candidates::*;
pub use memory::*;
pub use normalize::*;
pub use repository::*;
pub use resolve::*;
pub use similarity::*;
pub use types::*;
