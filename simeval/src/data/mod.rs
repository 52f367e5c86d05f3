//! Input loading and alignment

pub mod align;
pub mod format;
pub mod reader;

pub use align::{
    load_corpus, transpose, AlignError, AlignedCorpus, InputPaths, ReferenceTable, SourceStrategy,
};
pub use format::InputFormat;
pub use reader::{
    parse_plain_text, parse_record_stream, parse_rows, parse_tab_separated, read_document,
    Document, LoadError, Row, RowContent,
};
