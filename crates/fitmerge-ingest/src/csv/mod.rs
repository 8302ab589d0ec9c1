//! CSV reading, writing and header sniffing.

mod reader;
mod sniff;
mod writer;

pub use reader::{RawTable, ReadOptions, parse_raw_table, read_raw_table};
pub use sniff::{
    find_header_row, header_index, line_has_keywords, locate_header_row, read_head_lines,
};
pub use writer::write_frame_csv;
