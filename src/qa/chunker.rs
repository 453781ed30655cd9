//! Fixed-size character chunking of extracted text.

/// Split `text` into contiguous, non-overlapping chunks of at most `size`
/// characters, preserving order; the final chunk may be shorter.
/// Concatenating the chunks reconstructs `text` exactly.
pub fn chunk(text: &str, size: usize) -> Vec<String> {
    assert!(size >= 1, "chunk size must be at least 1");

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == size {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
