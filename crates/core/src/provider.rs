//! The thumbnail provider: the per-file extension object the shell
//! creates, binds to a stream, and asks for a bitmap.

use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::guid::{Guid, IID_IINITIALIZE_WITH_STREAM, IID_ITHUMBNAIL_PROVIDER, IID_IUNKNOWN};
use crate::hresult::{HResult, E_INVALIDARG, S_OK};
use crate::module::ModuleHandle;
use crate::object::{ComClass, ComRef};
use crate::source::SharedSource;
use crate::surface::{AlphaType, Bitmap, SoftwareAllocator, SurfaceAllocator};

/// Placeholder fill, opaque red in BGRA. An archive-aware decoder
/// replaces this; decoding is outside this crate.
const PLACEHOLDER_BGRA: [u8; 4] = [0, 0, 255, 255];

pub struct ComicThumbProvider {
    module: ModuleHandle,
    surfaces: Arc<dyn SurfaceAllocator>,
    source: Mutex<Option<SharedSource>>,
}

impl ComClass for ComicThumbProvider {
    const INTERFACES: &'static [Guid] = &[
        IID_IUNKNOWN,
        IID_IINITIALIZE_WITH_STREAM,
        IID_ITHUMBNAIL_PROVIDER,
    ];
}

impl ComicThumbProvider {
    pub fn new(module: ModuleHandle) -> ComRef<Self> {
        Self::with_allocator(module, Arc::new(SoftwareAllocator))
    }

    pub fn with_allocator(
        module: ModuleHandle,
        surfaces: Arc<dyn SurfaceAllocator>,
    ) -> ComRef<Self> {
        module.instance_created();
        ComRef::new(Self {
            module,
            surfaces,
            source: Mutex::new(None),
        })
    }

    /// Second phase of initialization: bind the stream to render from.
    ///
    /// A missing source fails with `E_INVALIDARG` and leaves any
    /// previously bound source untouched. Rebinding releases the old
    /// source before adopting the new one; the last bind wins.
    pub fn initialize(&self, source: Option<&SharedSource>, _mode: u32) -> HResult {
        let Some(source) = source else {
            return E_INVALIDARG;
        };
        let mut bound = self.source.lock().unwrap();
        drop(bound.take());
        *bound = Some(Arc::clone(source));
        debug!(target: "ComicThumbProvider", "bound source, {} bytes", source.len());
        S_OK
    }

    /// Synchronous render of a `cx`×`cx` thumbnail.
    ///
    /// Arguments are validated before any surface is acquired; the
    /// surface is scoped to this call and released on every path. The
    /// placeholder fill does not read the bound source, so an unbound
    /// provider still renders.
    pub fn get_thumbnail(
        &self,
        cx: u32,
        bitmap: Option<&mut Option<Bitmap>>,
        alpha: Option<&mut AlphaType>,
    ) -> HResult {
        let (Some(bitmap_slot), Some(alpha_slot)) = (bitmap, alpha) else {
            return E_INVALIDARG;
        };
        if cx == 0 {
            return E_INVALIDARG;
        }

        let surface = match self.surfaces.acquire() {
            Ok(surface) => surface,
            Err(err) => {
                warn!(target: "ComicThumbProvider", "no drawing surface: {err}");
                return HResult::from(err);
            }
        };
        let mut produced = match surface.create_bitmap(cx) {
            Ok(produced) => produced,
            Err(err) => {
                warn!(target: "ComicThumbProvider", "bitmap creation failed: {err}");
                return HResult::from(err);
            }
        };
        produced.fill(PLACEHOLDER_BGRA);
        debug!(target: "ComicThumbProvider", "rendered placeholder thumbnail {cx}x{cx}");

        *bitmap_slot = Some(produced);
        *alpha_slot = AlphaType::Premultiplied;
        S_OK
    }
}

impl Drop for ComicThumbProvider {
    fn drop(&mut self) {
        self.module.instance_dropped();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use super::*;
    use crate::hresult::{E_FAIL, E_NOINTERFACE, E_POINTER};
    use crate::source::MemorySource;
    use crate::surface::{DrawingSurface, SurfaceError};

    /// Counts balanced acquire/release pairs and can be switched to
    /// fail every acquisition.
    #[derive(Default)]
    struct CountingAllocator {
        acquired: AtomicU32,
        live: AtomicU32,
        fail: AtomicBool,
    }

    struct CountingSurface<'a> {
        owner: &'a CountingAllocator,
    }

    impl DrawingSurface for CountingSurface<'_> {
        fn create_bitmap(&self, side: u32) -> Result<Bitmap, SurfaceError> {
            SoftwareAllocator.acquire()?.create_bitmap(side)
        }
    }

    impl Drop for CountingSurface<'_> {
        fn drop(&mut self) {
            self.owner.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl SurfaceAllocator for CountingAllocator {
        fn acquire(&self) -> Result<Box<dyn DrawingSurface + '_>, SurfaceError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SurfaceError::ContextUnavailable);
            }
            self.acquired.fetch_add(1, Ordering::SeqCst);
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingSurface { owner: self }))
        }
    }

    fn provider_with(
        allocator: Arc<CountingAllocator>,
    ) -> (ModuleHandle, ComRef<ComicThumbProvider>) {
        let module = ModuleHandle::new();
        let provider = ComicThumbProvider::with_allocator(module.clone(), allocator);
        (module, provider)
    }

    #[test]
    fn negotiation_table_covers_all_three_facets() {
        let (_, provider) = provider_with(Arc::default());
        for iid in [
            IID_IUNKNOWN,
            IID_IINITIALIZE_WITH_STREAM,
            IID_ITHUMBNAIL_PROVIDER,
        ] {
            let mut slot = None;
            assert_eq!(provider.query_interface(&iid, Some(&mut slot)), S_OK);
            assert!(slot.is_some());
        }
        let mut slot = None;
        let unknown = Guid::from_u128(0x11111111_2222_3333_4444_555555555555);
        assert_eq!(
            provider.query_interface(&unknown, Some(&mut slot)),
            E_NOINTERFACE
        );
        assert!(slot.is_none());
    }

    #[test]
    fn null_bind_fails_and_keeps_the_bound_source() {
        let (_, provider) = provider_with(Arc::default());
        let source = MemorySource::new(vec![1, 2, 3]);

        assert_eq!(provider.initialize(Some(&source), 0), S_OK);
        assert_eq!(Arc::strong_count(&source), 2);

        assert_eq!(provider.initialize(None, 0), E_INVALIDARG);
        assert_eq!(
            Arc::strong_count(&source),
            2,
            "failed bind must not release the bound source"
        );
    }

    #[test]
    fn rebind_releases_the_first_source() {
        let (_, provider) = provider_with(Arc::default());
        let first = MemorySource::new(vec![1]);
        let second = MemorySource::new(vec![2]);

        assert_eq!(provider.initialize(Some(&first), 0), S_OK);
        assert_eq!(Arc::strong_count(&first), 2);

        assert_eq!(provider.initialize(Some(&second), 0), S_OK);
        assert_eq!(Arc::strong_count(&first), 1, "first source released");
        assert_eq!(Arc::strong_count(&second), 2, "second source retained");
    }

    #[test]
    fn source_is_released_when_the_provider_dies() {
        let (_, provider) = provider_with(Arc::default());
        let source = MemorySource::new(vec![0; 16]);
        assert_eq!(provider.initialize(Some(&source), 0), S_OK);
        drop(provider);
        assert_eq!(Arc::strong_count(&source), 1);
    }

    #[test]
    fn invalid_render_arguments_acquire_nothing() {
        let allocator = Arc::new(CountingAllocator::default());
        let (_, provider) = provider_with(allocator.clone());
        let mut bitmap = None;
        let mut alpha = AlphaType::Unknown;

        assert_eq!(
            provider.get_thumbnail(0, Some(&mut bitmap), Some(&mut alpha)),
            E_INVALIDARG
        );
        assert_eq!(provider.get_thumbnail(64, None, Some(&mut alpha)), E_INVALIDARG);
        assert_eq!(provider.get_thumbnail(64, Some(&mut bitmap), None), E_INVALIDARG);
        assert_eq!(allocator.acquired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn render_releases_its_surface_on_success_and_failure() {
        let allocator = Arc::new(CountingAllocator::default());
        let (_, provider) = provider_with(allocator.clone());
        let mut bitmap = None;
        let mut alpha = AlphaType::Unknown;

        assert_eq!(
            provider.get_thumbnail(32, Some(&mut bitmap), Some(&mut alpha)),
            S_OK
        );
        assert_eq!(allocator.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(allocator.live.load(Ordering::SeqCst), 0, "surface released");

        allocator.fail.store(true, Ordering::SeqCst);
        let mut bitmap = None;
        assert_eq!(
            provider.get_thumbnail(32, Some(&mut bitmap), Some(&mut alpha)),
            E_FAIL
        );
        assert!(bitmap.is_none());
        assert_eq!(allocator.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unbound_render_produces_a_premultiplied_square() {
        let (_, provider) = provider_with(Arc::default());
        let mut bitmap = None;
        let mut alpha = AlphaType::Unknown;

        assert_eq!(
            provider.get_thumbnail(256, Some(&mut bitmap), Some(&mut alpha)),
            S_OK
        );
        let bitmap = bitmap.expect("bitmap ownership transfers to the caller");
        assert_eq!((bitmap.width(), bitmap.height()), (256, 256));
        assert_eq!(alpha, AlphaType::Premultiplied);
    }

    #[test]
    fn module_tracks_live_instances() {
        let module = ModuleHandle::new();
        let provider = ComicThumbProvider::new(module.clone());
        assert_eq!(module.live_instances(), 1);
        let retained = provider.retain();
        drop(provider);
        assert_eq!(module.live_instances(), 1, "still alive through a retain");
        drop(retained);
        assert_eq!(module.live_instances(), 0);
    }

    #[test]
    fn missing_negotiation_slot_is_a_pointer_error() {
        let (_, provider) = provider_with(Arc::default());
        assert_eq!(provider.query_interface(&IID_IUNKNOWN, None), E_POINTER);
    }
}
