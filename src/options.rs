/// Configuration for a [`crate::Loader`]. The defaults match the reference
/// behavior: a 1 MiB - 1 byte token buffer and at most five nested
/// `Include` files.
#[derive(Debug, Clone)]
pub struct Options {
    /// Capacity of the tokenizer's read buffer. No single token (including
    /// string literals) may be longer than this.
    pub buffer_capacity: usize,

    /// Maximum depth of the `Include` stack, not counting the original
    /// input file.
    pub max_include_depth: u32,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            buffer_capacity: 1024 * 1024 - 1,
            max_include_depth: 5,
        }
    }
}
