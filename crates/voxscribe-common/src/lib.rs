pub mod error;
pub mod types;

pub use error::VoxscribeError;
pub use types::Result;
