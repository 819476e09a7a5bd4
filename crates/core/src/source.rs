use std::io;
use std::sync::Arc;

/// Opaque stream handle a host binds into a provider. Methods take
/// `&self` because the handle stays shared between the host and the
/// provider for its whole lifetime.
pub trait DataSource: Send + Sync {
    /// Total content size in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the entire content.
    fn read_to_end(&self) -> io::Result<Vec<u8>>;
}

/// How sources are passed around: the `Arc` strong count is the
/// observable retain/release behavior of bind and rebind.
pub type SharedSource = Arc<dyn DataSource>;

/// Byte-buffer source used by the command-line host and tests.
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: Vec<u8>) -> SharedSource {
        Arc::new(Self { bytes })
    }
}

impl DataSource for MemorySource {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_to_end(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
