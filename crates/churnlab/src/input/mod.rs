//! Raw input records, shape detection and file decoding.

mod raw;
mod reader;
mod structure;

pub use raw::{
    RawRecord, get_any, get_literal, get_path, is_missing, is_null_text, leaf_paths, value_text,
};
pub use reader::{parse_delimited, parse_json, read_records};
pub use structure::{RecordStructure, StructureDetector};
