pub mod decode;
pub mod graph;
pub mod transition;

pub type Index = u32;
pub type Label = u32;
pub type Score = f32;

/// The synthetic root token; it never receives an arc.
pub const ROOT: Index = 0;

/// Upper bound on heads per word used when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 17;

/// `max_heads` for a sentence of `num_words` words; the root counts as a token.
#[inline]
pub fn max_heads(capacity: usize, num_words: usize) -> usize {
    capacity.min(num_words + 1)
}
