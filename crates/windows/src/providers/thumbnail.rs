use log::{info, warn};

use comic_thumbs::module::ModuleHandle;
use comic_thumbs::object::ComRef;
use comic_thumbs::provider::ComicThumbProvider;
use comic_thumbs::surface::AlphaType;
use windows::{
    core::{implement, IUnknown, Interface, GUID},
    Win32::{
        Foundation::E_INVALIDARG,
        Graphics::Gdi::HBITMAP,
        System::Com::IStream,
        UI::Shell::{PropertiesSystem::IInitializeWithStream_Impl, *},
    },
};

use crate::utils::{bitmap_to_hbitmap, check};
use crate::win_stream::WinStream;

/// COM shim over the core provider. The `windows` crate supplies the
/// `IUnknown` plumbing the shell talks to; every operation defers to
/// the core object.
#[implement(
    windows::Win32::UI::Shell::IThumbnailProvider,
    windows::Win32::UI::Shell::PropertiesSystem::IInitializeWithStream
)]
pub struct ComicThumbnailHandler {
    inner: ComRef<ComicThumbProvider>,
}

impl ComicThumbnailHandler {
    /// Creates a handler and negotiates `riid` on it, writing the
    /// result into `ppv_object`.
    pub fn create(
        module: ModuleHandle,
        riid: *const GUID,
        ppv_object: *mut *mut core::ffi::c_void,
    ) -> windows::core::Result<()> {
        let unknown: IUnknown = ComicThumbnailHandler {
            inner: ComicThumbProvider::new(module),
        }
        .into();
        unsafe { unknown.query(&*riid, ppv_object).ok() }
    }
}

impl IThumbnailProvider_Impl for ComicThumbnailHandler {
    fn GetThumbnail(
        &self,
        cx: u32,
        phbmp: *mut HBITMAP,
        pdwalpha: *mut WTS_ALPHATYPE,
    ) -> windows::core::Result<()> {
        if phbmp.is_null() || pdwalpha.is_null() {
            return Err(E_INVALIDARG.into());
        }

        let mut bitmap = None;
        let mut alpha = AlphaType::Unknown;
        let hr = self
            .inner
            .get_thumbnail(cx, Some(&mut bitmap), Some(&mut alpha));
        if hr.is_err() {
            warn!(target: "ComicThumbnailHandler", "render failed: {hr}");
            return check(hr);
        }
        let bitmap = bitmap.expect("successful render always yields a bitmap");
        info!(target: "ComicThumbnailHandler", "rendered {}x{} thumbnail", bitmap.width(), bitmap.height());

        unsafe {
            phbmp.write(bitmap_to_hbitmap(&bitmap)?);
            pdwalpha.write(match alpha {
                AlphaType::Unknown => WTSAT_UNKNOWN,
                AlphaType::NoAlpha => WTSAT_RGB,
                AlphaType::Premultiplied | AlphaType::Straight => WTSAT_ARGB,
            });
        }
        Ok(())
    }
}

impl IInitializeWithStream_Impl for ComicThumbnailHandler {
    fn Initialize(&self, pstream: &Option<IStream>, grfmode: u32) -> windows::core::Result<()> {
        let source = pstream.as_ref().map(|s| WinStream::shared(s.to_owned()));
        check(self.inner.initialize(source.as_ref(), grfmode))
    }
}
