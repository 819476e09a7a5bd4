use std::fmt;

use crate::surface::SurfaceError;

/// COM-style status code. Non-negative values are success codes,
/// negative values are failures.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HResult(pub i32);

pub const S_OK: HResult = HResult(0);
pub const S_FALSE: HResult = HResult(1);
pub const E_NOINTERFACE: HResult = HResult(0x8000_4002_u32 as i32);
pub const E_POINTER: HResult = HResult(0x8000_4003_u32 as i32);
pub const E_FAIL: HResult = HResult(0x8000_4005_u32 as i32);
pub const E_OUTOFMEMORY: HResult = HResult(0x8007_000E_u32 as i32);
pub const E_INVALIDARG: HResult = HResult(0x8007_0057_u32 as i32);
/// Two-phase initialization was skipped before a call that needs it.
pub const E_NOT_VALID_STATE: HResult = HResult(0x8007_139F_u32 as i32);
pub const CLASS_E_NOAGGREGATION: HResult = HResult(0x8004_0110_u32 as i32);
pub const CLASS_E_CLASSNOTAVAILABLE: HResult = HResult(0x8004_0111_u32 as i32);

impl HResult {
    pub const fn is_ok(self) -> bool {
        self.0 >= 0
    }

    pub const fn is_err(self) -> bool {
        self.0 < 0
    }
}

impl From<SurfaceError> for HResult {
    fn from(err: SurfaceError) -> Self {
        match err {
            SurfaceError::OutOfMemory { .. } => E_OUTOFMEMORY,
            SurfaceError::ContextUnavailable => E_FAIL,
        }
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            S_OK => "S_OK",
            S_FALSE => "S_FALSE",
            E_NOINTERFACE => "E_NOINTERFACE",
            E_POINTER => "E_POINTER",
            E_FAIL => "E_FAIL",
            E_OUTOFMEMORY => "E_OUTOFMEMORY",
            E_INVALIDARG => "E_INVALIDARG",
            E_NOT_VALID_STATE => "E_NOT_VALID_STATE",
            CLASS_E_NOAGGREGATION => "CLASS_E_NOAGGREGATION",
            CLASS_E_CLASSNOTAVAILABLE => "CLASS_E_CLASSNOTAVAILABLE",
            HResult(code) => return write!(f, "HRESULT(0x{:08X})", code as u32),
        };
        f.write_str(name)
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
