pub mod bands;
pub mod derived;
pub mod format;
pub mod scores;

pub use bands::*;
pub use derived::*;
pub use format::*;
pub use scores::*;
