pub mod reader;
pub mod tags;
pub mod tiff;
pub mod writer;

pub use reader::{detect_found_categories, read_datetimes, ExifDateTimes};
pub use writer::{apply_datetime_offset, parse_datetime, strip_categories};
