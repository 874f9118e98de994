//! Command Handlers

mod extract_handlers;
mod ingest_handlers;
mod library_handlers;

pub use extract_handlers::{DriverConfig, RunExtractionHandler, RunSummary};
pub use ingest_handlers::{IngestDocumentHandler, IngestReport};
pub use library_handlers::{DocumentOutcome, LibraryReport, RunLibraryHandler};

#[cfg(test)]
pub(crate) mod test_support;
