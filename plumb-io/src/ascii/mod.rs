mod ascii_format_util;
pub(crate) use self::ascii_format_util::*;
pub use self::ascii_format_util::WHITESPACE;

mod ascii_reader;
pub use self::ascii_reader::*;

mod ascii_writer;
pub use self::ascii_writer::*;
