pub mod error;
pub mod stream;
pub mod types;

pub use error::*;
pub use stream::*;
pub use types::*;
