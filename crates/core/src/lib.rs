//! Object model for the comic-archive thumbnail shell extension.
//!
//! Everything the shell-facing layers need is defined here in portable
//! Rust: the reference-counted object handle, capability negotiation,
//! the thumbnail provider and its class factory, module-wide state and
//! the registry records written at install time. The Windows crates in
//! this workspace only bridge these objects to real COM.

pub mod factory;
pub mod guid;
pub mod hresult;
pub mod module;
pub mod object;
pub mod provider;
pub mod registry;
pub mod source;
pub mod surface;

use guid::Guid;

/// CLSID of the provider. Must match the DLL exports and the registry
/// bindings bit-for-bit.
pub const CLSID_COMIC_THUMB_PROVIDER: Guid =
    Guid::from_u128(0xf3a9f6d8_4e96_4c2b_a3b0_9a3e2f4c1c6e);

/// Shell Thumbnail Provider category, written under
/// `<.ext>\shellex\{CATID}` to bind the extension to the provider.
pub const SHELL_THUMB_HANDLER_CATID: Guid =
    Guid::from_u128(0xe357fccd_a995_4576_b01f_234630154e96);

/// File extension this provider handles.
pub const DEFAULT_EXT: &str = ".cbz";

/// Human-friendly provider name (`CLSID\{CLSID}\(Default)`).
pub const FRIENDLY_NAME: &str = "Comic Archive Thumbnail Provider";
