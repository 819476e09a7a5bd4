use std::fmt;

/// 128-bit class/interface identifier, packed the same way
/// `GUID::from_u128` packs a Windows GUID.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(u128);

impl Guid {
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub const fn to_u128(self) -> u128 {
        self.0
    }

    /// Braced uppercase registry form, e.g.
    /// `{E357FCCD-A995-4576-B01F-234630154E96}`.
    pub fn to_braced(self) -> String {
        format!("{{{}}}", self)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 56) as u8,
            (v >> 48) as u8,
            (v >> 40) as u8,
            (v >> 32) as u8,
            (v >> 24) as u8,
            (v >> 16) as u8,
            (v >> 8) as u8,
            v as u8,
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Interface id of the generic identity facet (`IUnknown`).
pub const IID_IUNKNOWN: Guid = Guid::from_u128(0x00000000_0000_0000_c000_000000000046);

/// Interface id of the factory facet (`IClassFactory`).
pub const IID_ICLASS_FACTORY: Guid = Guid::from_u128(0x00000001_0000_0000_c000_000000000046);

/// Interface id of the bind-to-stream facet (`IInitializeWithStream`).
pub const IID_IINITIALIZE_WITH_STREAM: Guid =
    Guid::from_u128(0xb824b49d_22ac_4161_ac8a_9916e8fa3f7f);

/// Interface id of the rendering facet (`IThumbnailProvider`).
pub const IID_ITHUMBNAIL_PROVIDER: Guid =
    Guid::from_u128(0xe357fccd_a995_4576_b01f_234630154e96);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_registry_text() {
        assert_eq!(
            IID_ITHUMBNAIL_PROVIDER.to_string(),
            "E357FCCD-A995-4576-B01F-234630154E96"
        );
        assert_eq!(
            IID_IUNKNOWN.to_braced(),
            "{00000000-0000-0000-C000-000000000046}"
        );
    }
}
