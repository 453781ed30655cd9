use crate::config::ExtractionConfig;
use crate::document::{Document, ExtractionCache, MediaType};
use std::sync::Arc;

/// Best-effort text extraction for PDF and Word documents.
///
/// Extraction never fails: a page or image that cannot be decoded is
/// skipped, and a wholly unreadable file yields empty text, which the
/// pipeline treats as "no relevant content".
#[derive(Clone)]
pub struct TextExtractor {
    config: ExtractionConfig,
}

impl TextExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract a single document's text, truncated to the configured
    /// character cap.
    pub fn extract(&self, document: &Document) -> String {
        let text = match document.media_type {
            MediaType::Pdf => self.extract_pdf(&document.content, &document.name),
            MediaType::Docx => self.extract_docx(&document.content, &document.name),
        };
        match self.config.max_chars {
            Some(max) => truncate_chars(&text, max),
            None => text,
        }
    }

    /// Extract every document, one blocking worker per file, merged back in
    /// input order. Consults `cache` before extracting and fills it after.
    pub async fn extract_all(
        &self,
        documents: &[Document],
        cache: &ExtractionCache,
    ) -> Vec<Arc<String>> {
        let mut results: Vec<Option<Arc<String>>> = vec![None; documents.len()];
        let mut pending = Vec::new();

        for (index, doc) in documents.iter().enumerate() {
            let key = ExtractionCache::key(&doc.content);
            if let Some(text) = cache.get(&key) {
                log::debug!("extraction cache hit for {}", doc.name);
                results[index] = Some(text);
            } else {
                let extractor = self.clone();
                let doc = doc.clone();
                let handle = tokio::task::spawn_blocking(move || extractor.extract(&doc));
                pending.push((index, key, handle));
            }
        }

        let handles: Vec<_> = pending.iter_mut().map(|(_, _, h)| h).collect();
        let outputs = futures::future::join_all(handles).await;

        for ((index, key, _), output) in pending.iter().zip(outputs) {
            let text = match output {
                Ok(text) => Arc::new(text),
                Err(e) => {
                    log::warn!("extraction worker failed: {}", e);
                    Arc::new(String::new())
                }
            };
            cache.put(key.clone(), text.clone());
            results[*index] = Some(text);
        }

        results
            .into_iter()
            .map(|text| text.unwrap_or_default())
            .collect()
    }

    /// Per-page extraction via lopdf, falling back to pdf-extract's
    /// whole-document pass when no page yields text.
    fn extract_pdf(&self, data: &[u8], name: &str) -> String {
        let doc = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("failed to load PDF {}: {}", name, e);
                return pdf_extract_fallback(data, name);
            }
        };

        let mut text = String::new();
        for (page_num, _page_id) in doc.get_pages() {
            match doc.extract_text(&[page_num]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    if !page_text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                Err(e) => log::warn!("skipping page {} of {}: {}", page_num, name, e),
            }

            #[cfg(feature = "ocr")]
            for recognized in self.ocr_page_images(&doc, _page_id, name) {
                text.push_str(&recognized);
                if !recognized.ends_with('\n') {
                    text.push('\n');
                }
            }
        }

        if text.trim().is_empty() {
            // No text layer found page by page; likely an extractor gap
            return pdf_extract_fallback(data, name);
        }
        text
    }

    #[cfg(feature = "ocr")]
    fn ocr_page_images(
        &self,
        doc: &lopdf::Document,
        page_id: lopdf::ObjectId,
        name: &str,
    ) -> Vec<String> {
        let mut out = Vec::new();
        for image_bytes in page_image_streams(doc, page_id) {
            match crate::document::ocr::recognize(
                &image_bytes,
                self.config.ocr_datapath.as_deref(),
                &self.config.ocr_lang,
            ) {
                Ok(text) if !text.trim().is_empty() => out.push(text),
                Ok(_) => {}
                Err(e) => log::debug!("OCR skipped an image in {}: {}", name, e),
            }
        }
        out
    }

    /// Paragraph text in order, one line per paragraph.
    fn extract_docx(&self, data: &[u8], name: &str) -> String {
        let doc = match docx_rs::read_docx(data) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("failed to load Word document {}: {}", name, e);
                return String::new();
            }
        };

        let mut text = String::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut line = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                line.push_str(&t.text);
                            }
                        }
                    }
                }
                text.push_str(&line);
                text.push('\n');
            }
        }
        text
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

fn pdf_extract_fallback(data: &[u8], name: &str) -> String {
    match pdf_extract::extract_text_from_mem(data) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("unreadable PDF {}: {}", name, e);
            String::new()
        }
    }
}

/// Character-boundary-safe truncation.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Embedded image XObject streams on a page, best effort.
#[cfg(feature = "ocr")]
fn page_image_streams(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> Vec<Vec<u8>> {
    use lopdf::Object;

    fn resolve_dict<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> Option<&'a lopdf::Dictionary> {
        match obj {
            Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    let mut images = Vec::new();
    let page_dict = match doc.get_dictionary(page_id) {
        Ok(dict) => dict,
        Err(_) => return images,
    };
    let resources = match page_dict.get(b"Resources").ok().and_then(|o| resolve_dict(doc, o)) {
        Some(dict) => dict,
        None => return images,
    };
    let xobjects = match resources.get(b"XObject").ok().and_then(|o| resolve_dict(doc, o)) {
        Some(dict) => dict,
        None => return images,
    };

    for (_, obj) in xobjects.iter() {
        let stream = match obj {
            Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_stream().ok()),
            Object::Stream(s) => Some(s),
            _ => None,
        };
        let stream = match stream {
            Some(s) => s,
            None => continue,
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|s| s.as_name().ok())
            .map(|n| n == b"Image")
            .unwrap_or(false);
        if !is_image {
            continue;
        }
        // DCTDecode streams are JPEG as stored; others may inflate
        let bytes = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        images.push(bytes);
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn garbage_pdf_degrades_to_empty_text() {
        let doc = Document::new("broken.pdf", MediaType::Pdf, b"not a pdf at all".to_vec());
        assert_eq!(TextExtractor::default().extract(&doc), "");
    }

    #[test]
    fn garbage_docx_degrades_to_empty_text() {
        let doc = Document::new("broken.docx", MediaType::Docx, vec![0u8; 64]);
        assert_eq!(TextExtractor::default().extract(&doc), "");
    }

    #[test]
    fn truncation_is_char_boundary_safe() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("短い文章です", 3), "短い文");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[tokio::test]
    async fn extract_all_fills_and_reuses_the_cache() {
        let docs = vec![
            Document::new("a.pdf", MediaType::Pdf, b"garbage one".to_vec()),
            Document::new("b.docx", MediaType::Docx, b"garbage two".to_vec()),
        ];
        let cache = ExtractionCache::default();
        let extractor = TextExtractor::default();

        let texts = extractor.extract_all(&docs, &cache).await;
        assert_eq!(texts.len(), 2);
        assert_eq!(cache.len(), 2);

        // Second pass is served from the cache (same Arc comes back).
        let again = extractor.extract_all(&docs, &cache).await;
        assert!(Arc::ptr_eq(&texts[0], &again[0]));
        assert!(Arc::ptr_eq(&texts[1], &again[1]));
    }
}
