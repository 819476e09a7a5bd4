use std::io::{self, ErrorKind, Read};
use std::sync::Arc;

use comic_thumbs::source::{DataSource, SharedSource};
use windows::Win32::System::Com::{IStream, STATSTG};

/// `IStream` wrapped as the core's data source.
pub struct WinStream {
    stream: IStream,
}

// The provider is registered apartment-threaded; the shell serializes
// every call that touches the stream.
unsafe impl Send for WinStream {}
unsafe impl Sync for WinStream {}

impl WinStream {
    pub fn shared(stream: IStream) -> SharedSource {
        Arc::new(Self { stream })
    }

    fn stat_size(&self) -> windows::core::Result<u64> {
        unsafe {
            let mut stats = STATSTG::default();
            self.stream.Stat(&mut stats, 0)?;
            Ok(stats.cbSize)
        }
    }

    fn read_chunk(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut bytes_read = 0u32;
        unsafe {
            self.stream
                .Read(buf.as_mut_ptr() as _, buf.len() as u32, &mut bytes_read)
        }
        .map_err(|err| {
            io::Error::new(
                ErrorKind::Other,
                format!("IStream::Read failed: {}", err.code().0),
            )
        })?;
        Ok(bytes_read as usize)
    }
}

impl From<IStream> for WinStream {
    fn from(stream: IStream) -> Self {
        Self { stream }
    }
}

impl Read for &WinStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_chunk(buf)
    }
}

impl DataSource for WinStream {
    fn len(&self) -> u64 {
        self.stat_size().unwrap_or(0)
    }

    fn read_to_end(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut reader = self;
        Read::read_to_end(&mut reader, &mut buffer)?;
        Ok(buffer)
    }
}
