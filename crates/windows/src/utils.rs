use std::mem;

use comic_thumbs::hresult::HResult;
use comic_thumbs::surface::Bitmap;
use windows::Win32::Graphics::Gdi::{
    CreateDIBSection, BITMAPINFO, BITMAPINFOHEADER, DIB_RGB_COLORS, HBITMAP, HDC,
};

/// Maps a core status code onto a `windows` crate result.
pub fn check(hr: HResult) -> windows::core::Result<()> {
    windows::core::HRESULT(hr.0).ok()
}

/// Allocates a top-down 32bpp DIB section and exposes its pixel bits.
pub unsafe fn create_argb_bitmap(
    width: u32,
    height: u32,
    p_bits: &mut *mut core::ffi::c_void,
) -> HBITMAP {
    let bmi = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width as i32,
            biHeight: -(height as i32),
            biPlanes: 1,
            biBitCount: 32,
            ..Default::default()
        },
        ..Default::default()
    };
    CreateDIBSection(
        core::mem::zeroed::<HDC>(),
        &bmi,
        DIB_RGB_COLORS,
        p_bits,
        core::mem::zeroed::<windows::Win32::Foundation::HANDLE>(),
        0,
    )
}

/// Copies a core bitmap into a freshly created DIB section.
pub unsafe fn bitmap_to_hbitmap(bitmap: &Bitmap) -> windows::core::Result<HBITMAP> {
    let mut p_bits: *mut core::ffi::c_void = core::ptr::null_mut();
    let hbmp = create_argb_bitmap(bitmap.width(), bitmap.height(), &mut p_bits);
    if hbmp.is_invalid() || p_bits.is_null() {
        return Err(windows::Win32::Foundation::E_FAIL.into());
    }
    let pixels = bitmap.pixels();
    std::ptr::copy_nonoverlapping(pixels.as_ptr(), p_bits as *mut u8, pixels.len());
    Ok(hbmp)
}
