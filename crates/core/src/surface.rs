//! Drawing surfaces and the bitmaps rendered onto them.
//!
//! A render call acquires one surface from its allocator, draws, and
//! releases the surface before returning — the surface never outlives
//! the call. The allocator is injected so the command-line host uses a
//! plain software surface while tests count and fail acquisitions.

use thiserror::Error;

/// Pixel layout of every produced bitmap: 32-bit BGRA, premultiplied
/// alpha, top-down rows. Matches a 32bpp DIB section.
pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("no drawing context available")]
    ContextUnavailable,
    #[error("bitmap allocation failed ({width}x{height})")]
    OutOfMemory { width: u32, height: u32 },
}

/// Alpha disposition of a produced bitmap. The first three values
/// match `WTS_ALPHATYPE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum AlphaType {
    Unknown = 0,
    NoAlpha = 1,
    Premultiplied = 2,
    Straight = 3,
}

/// Bitmap handed to the caller; ownership transfers on a successful
/// render and the caller is responsible for dropping it.
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Solid fill with one BGRA pixel value.
    pub fn fill(&mut self, bgra: [u8; BYTES_PER_PIXEL]) {
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&bgra);
        }
    }
}

/// One drawing surface scoped to a single render call. Dropping the
/// surface releases whatever its allocator acquired for it.
pub trait DrawingSurface {
    fn create_bitmap(&self, side: u32) -> Result<Bitmap, SurfaceError>;
}

/// Source of drawing surfaces, injected into providers.
pub trait SurfaceAllocator: Send + Sync {
    fn acquire(&self) -> Result<Box<dyn DrawingSurface + '_>, SurfaceError>;
}

/// Plain in-memory surface; the portable stand-in for a GDI memory DC.
pub struct SoftwareAllocator;

struct SoftwareSurface;

impl DrawingSurface for SoftwareSurface {
    fn create_bitmap(&self, side: u32) -> Result<Bitmap, SurfaceError> {
        let len = (side as usize)
            .checked_mul(side as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(SurfaceError::OutOfMemory {
                width: side,
                height: side,
            })?;
        Ok(Bitmap {
            width: side,
            height: side,
            pixels: vec![0; len],
        })
    }
}

impl SurfaceAllocator for SoftwareAllocator {
    fn acquire(&self) -> Result<Box<dyn DrawingSurface + '_>, SurfaceError> {
        Ok(Box::new(SoftwareSurface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_surface_allocates_zeroed_bgra() {
        let surface = SoftwareAllocator.acquire().unwrap();
        let bitmap = surface.create_bitmap(4).unwrap();
        assert_eq!(bitmap.width(), 4);
        assert_eq!(bitmap.height(), 4);
        assert_eq!(bitmap.pixels().len(), 4 * 4 * BYTES_PER_PIXEL);
        assert!(bitmap.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_writes_every_pixel() {
        let surface = SoftwareAllocator.acquire().unwrap();
        let mut bitmap = surface.create_bitmap(2).unwrap();
        bitmap.fill([1, 2, 3, 255]);
        for px in bitmap.pixels().chunks_exact(BYTES_PER_PIXEL) {
            assert_eq!(px, [1, 2, 3, 255]);
        }
    }
}
