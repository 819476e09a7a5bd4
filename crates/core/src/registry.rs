//! Registry records written at install time and removed at uninstall.
//!
//! This module only describes the records; applying them is the job
//! of the DLL crate, which is the single place with registry access.
//! Every value in the ledger is string data.

use crate::guid::Guid;
use crate::{CLSID_COMIC_THUMB_PROVIDER, DEFAULT_EXT, FRIENDLY_NAME, SHELL_THUMB_HANDLER_CATID};

/// A named string value under a key; an empty name is the key default.
#[derive(Debug)]
pub struct RegistryValue(pub String, pub String);

#[derive(Debug)]
pub struct RegistryKey {
    pub path: String,
    pub values: Vec<RegistryValue>,
}

/// CLSID registration: friendly name plus the in-process server path.
/// The provider is apartment-threaded; the host serializes calls.
pub fn register_clsid(clsid: &Guid, module_path: &str) -> Vec<RegistryKey> {
    vec![
        RegistryKey {
            path: format!("CLSID\\{}", clsid.to_braced()),
            values: vec![RegistryValue(String::new(), FRIENDLY_NAME.to_owned())],
        },
        RegistryKey {
            path: format!("CLSID\\{}\\InprocServer32", clsid.to_braced()),
            values: vec![
                RegistryValue(String::new(), module_path.to_owned()),
                RegistryValue("ThreadingModel".to_owned(), "Apartment".to_owned()),
            ],
        },
    ]
}

/// Every key written at install time, in creation order.
pub fn registration_keys(module_path: &str) -> Vec<RegistryKey> {
    let mut keys = register_clsid(&CLSID_COMIC_THUMB_PROVIDER, module_path);
    keys.push(RegistryKey {
        path: format!(
            "{}\\shellex\\{}",
            DEFAULT_EXT,
            SHELL_THUMB_HANDLER_CATID.to_braced()
        ),
        values: vec![RegistryValue(
            String::new(),
            CLSID_COMIC_THUMB_PROVIDER.to_braced(),
        )],
    });
    keys
}

/// Key paths removed at uninstall, deepest first.
pub fn unregistration_paths() -> Vec<String> {
    vec![
        format!(
            "{}\\shellex\\{}",
            DEFAULT_EXT,
            SHELL_THUMB_HANDLER_CATID.to_braced()
        ),
        format!(
            "CLSID\\{}\\InprocServer32",
            CLSID_COMIC_THUMB_PROVIDER.to_braced()
        ),
        format!("CLSID\\{}", CLSID_COMIC_THUMB_PROVIDER.to_braced()),
    ]
}
