//! Word-count chunking for summarization input
//!
//! The summarization model has a bounded input length, and extracted section
//! text is usually far longer. Text is split on whitespace into fixed-size
//! word windows; each window is summarized independently and the fragments
//! are rejoined in order.

/// Default chunk size in words, sized to the summarization model's limits
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Split text into consecutive chunks of up to `chunk_size` words.
///
/// Chunks are non-overlapping and cover the whitespace-tokenized input
/// exactly once in original order; the last chunk may be shorter. Empty or
/// whitespace-only input yields no chunks. A `chunk_size` of 0 is treated
/// as 1 so the split is total for any input.
pub fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let size = chunk_size.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    words.chunks(size).map(|window| window.join(" ")).collect()
}

/// Number of chunks a text of `word_count` words produces
pub fn num_chunks(word_count: usize, chunk_size: usize) -> usize {
    let size = chunk_size.max(1);
    (word_count + size - 1) / size
}
