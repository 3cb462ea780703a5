use thiserror::Error;

mod subset;
mod text;

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation
/// number).
pub type PageId = (u32, u16);

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Page {position} out of range: document has {count} pages")]
    PageOutOfRange { position: usize, count: usize },
    #[error("PDF save error: {0}")]
    Save(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A loaded shipping-label document.
///
/// Constructed via [`LabelDocument::from_bytes`]. Pages are addressed by
/// their stable 0-based position in the original document. The type covers
/// exactly what the sorting pipeline needs from a PDF: the page count,
/// per-page plain text, and serialization of an ordered page subset into a
/// new document. The loaded document itself is never mutated.
pub struct LabelDocument {
    doc: lopdf::Document,
    page_ids: Vec<PageId>,
}

impl LabelDocument {
    /// Parse a PDF from an in-memory byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        // get_pages is keyed by 1-based page number; BTreeMap iteration
        // yields document order, so index = position.
        let page_ids = doc.get_pages().into_values().collect();

        Ok(LabelDocument { doc, page_ids })
    }

    /// Total number of pages.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Plain text of the page at `position`.
    ///
    /// A page with no extractable text yields an empty string -- a valid,
    /// meaningful input downstream (it classifies as unparsed). A content
    /// stream that fails to decode degrades to an empty string as well
    /// rather than aborting the run; only an out-of-range position is an
    /// error.
    pub fn page_text(&self, position: usize) -> Result<String, PdfError> {
        let page_id = self.page_id(position)?;
        match text::extract_page_text(&self.doc, page_id) {
            Ok(text) => Ok(text),
            Err(err) => {
                log::debug!("page {position}: text extraction failed: {err}");
                Ok(String::new())
            }
        }
    }

    /// Serialize a new PDF containing the pages at `positions`, in exactly
    /// that order. Page content is copied untouched; only the page tree of
    /// the output differs from the source document.
    pub fn select_pages(&self, positions: &[usize]) -> Result<Vec<u8>, PdfError> {
        let ids = positions
            .iter()
            .map(|&p| self.page_id(p))
            .collect::<Result<Vec<_>, _>>()?;
        subset::subset_document(&self.doc, &ids)
    }

    fn page_id(&self, position: usize) -> Result<PageId, PdfError> {
        self.page_ids
            .get(position)
            .copied()
            .ok_or(PdfError::PageOutOfRange {
                position,
                count: self.page_ids.len(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
