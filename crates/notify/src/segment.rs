//! Splitting of long digests into channel-sized messages.
//!
//! A digest is a series of sections joined by [`SECTION_DELIMITER`]. Sections
//! are packed greedily into chunks; a section is never split across two
//! chunks, so joining the chunks with the delimiter gives back the input.

/// Separator between record blocks in a rendered digest.
pub const SECTION_DELIMITER: &str = "\n---\n";

/// Length of a message as counted by the chat APIs (Unicode scalar values).
#[must_use]
pub fn message_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into chunks that fit within `limit` characters.
///
/// Text within the limit comes back as a single chunk. Otherwise sections
/// are appended to the current chunk while
/// `len(chunk) + len(section) + 5 < limit`, counting the delimiters already
/// appended to the chunk.
///
/// A single section longer than `limit` is emitted as its own oversized
/// chunk rather than being cut.
#[must_use]
pub fn segment(text: &str, limit: usize) -> Vec<String> {
    if message_len(text) <= limit {
        return vec![text.to_string()];
    }

    let delimiter_len = message_len(SECTION_DELIMITER);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for section in text.split(SECTION_DELIMITER) {
        let section_len = message_len(section);

        if current_len + section_len + delimiter_len < limit {
            current.push_str(section);
            current.push_str(SECTION_DELIMITER);
            current_len += section_len + delimiter_len;
        } else {
            if !current.is_empty() {
                chunks.push(close_chunk(&current));
            }
            current = format!("{section}{SECTION_DELIMITER}");
            current_len = section_len + delimiter_len;
        }
    }

    if !current.is_empty() {
        chunks.push(close_chunk(&current));
    }

    chunks
}

/// Drop the single delimiter appended after the last packed section.
fn close_chunk(chunk: &str) -> String {
    chunk
        .strip_suffix(SECTION_DELIMITER)
        .unwrap_or(chunk)
        .to_string()
}
