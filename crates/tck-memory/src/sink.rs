use crate::index::{IndexedDocument, MemoryIndex};
use std::sync::Arc;
use tck_core::{backend::DocumentSink, document::Document, error::SearchError};
use tracing::debug;

///
/// MemorySink
///
/// Documents are validated and encoded on `add` and committed together on
/// `join`; nothing is searchable before that.
///

#[derive(Debug)]
pub struct MemorySink {
    index: Arc<MemoryIndex>,
    buffer: Vec<IndexedDocument>,
}

impl MemorySink {
    #[must_use]
    pub const fn new(index: Arc<MemoryIndex>) -> Self {
        Self {
            index,
            buffer: Vec::new(),
        }
    }
}

impl DocumentSink for MemorySink {
    fn index_name(&self) -> &str {
        self.index.name()
    }

    fn add(&mut self, document: Document) -> Result<(), SearchError> {
        let indexed = IndexedDocument::index(self.index.schema(), document)?;
        self.buffer.push(indexed);

        Ok(())
    }

    fn join(self: Box<Self>) -> Result<(), SearchError> {
        let Self { index, buffer } = *self;
        let documents = buffer.len();
        index.commit(buffer);
        debug!(index = index.name(), documents, "committed sink");

        Ok(())
    }
}
