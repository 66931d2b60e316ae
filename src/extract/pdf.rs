use lopdf::Document;
use tracing::debug;

use super::ExtractError;

/// Extract the text of every page, in page order.
pub fn extract_text(data: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(data)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!(pages = pages.len(), "Loaded PDF");

    if pages.is_empty() {
        return Ok(String::new());
    }

    Ok(doc.extract_text(&pages)?)
}
