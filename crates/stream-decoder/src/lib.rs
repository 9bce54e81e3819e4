pub mod decoder;
pub mod pump;

pub use decoder::{StreamDecoder, JSON_END, JSON_START};
pub use pump::decode_stream;
