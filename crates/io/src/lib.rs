// Report I/O: archive extraction, source readers, xlsx writers

pub mod archive;
pub mod html;
pub mod report;
pub mod source;

pub use report::{ReportWriter, SheetOutputs};
pub use source::{read_document, RawSheet, SheetFailure, SourceDocument, SourceFormat};
