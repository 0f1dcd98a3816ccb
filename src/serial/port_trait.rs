//! Trait abstraction for the receiver byte stream to enable testing

use async_trait::async_trait;
use std::io;

/// Trait for sources of raw receiver bytes
#[async_trait]
pub trait ByteSource: Send {
    /// Read whatever is available into `buf`, waiting until at least one
    /// byte arrives
    ///
    /// Returns the number of bytes read, which may be less than `buf.len()`.
    /// A zero-length read is not an error.
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
