pub mod types;
pub mod cipher;

pub use types::*;
pub use cipher::*;
