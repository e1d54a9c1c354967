pub mod codec;
pub mod stream;

pub use stream::{JpegStream, Segment};
