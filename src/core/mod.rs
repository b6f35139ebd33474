pub mod error;
pub mod types;

pub use error::{HotswapError, Result};
pub use types::{ChangeEvent, ClassDefinition};
