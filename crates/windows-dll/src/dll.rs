use log::warn;
use windows::{
    core::{implement, IUnknown, Interface, GUID, HRESULT},
    Win32::{
        Foundation::*,
        System::{
            Com::*,
            LibraryLoader::{DisableThreadLibraryCalls, GetModuleFileNameW},
            SystemServices::DLL_PROCESS_ATTACH,
        },
    },
};
use winreg::{enums::HKEY_CLASSES_ROOT, RegKey};

use comic_thumbs::hresult;
use comic_thumbs::module::{can_unload_now, ModuleHandle};
use comic_thumbs::registry::{registration_keys, unregistration_paths};
use comic_thumbs::CLSID_COMIC_THUMB_PROVIDER;
use comic_thumbs_windows::providers::ComicThumbnailHandler;

const EVENT_SOURCE: &str = "Comic Thumbs";

static mut DLL_INSTANCE: HINSTANCE = HINSTANCE(0);

lazy_static! {
    // Created on first use after load; every factory shares it.
    static ref MODULE: ModuleHandle = ModuleHandle::new();
}

fn get_module_path(instance: HINSTANCE) -> Result<String, HRESULT> {
    let mut path: Vec<u16> = Vec::new();
    path.resize(1024, 0);
    let path_len = unsafe { GetModuleFileNameW(instance, path.as_mut_slice()) };

    let path_len = path_len as usize;
    if path_len == 0 || path_len >= path.len() {
        return Err(E_FAIL);
    }
    path.truncate(path_len);
    String::from_utf16(&path).map_err(|_| E_FAIL)
}

#[implement(windows::Win32::System::Com::IClassFactory)]
struct ShellClassFactory {
    module: ModuleHandle,
}

impl IClassFactory_Impl for ShellClassFactory {
    fn CreateInstance(
        &self,
        punkouter: &Option<IUnknown>,
        riid: *const GUID,
        ppvobject: *mut *mut core::ffi::c_void,
    ) -> windows::core::Result<()> {
        if punkouter.is_some() {
            return CLASS_E_NOAGGREGATION.ok();
        }
        ComicThumbnailHandler::create(self.module.clone(), riid, ppvobject)
    }

    fn LockServer(&self, flock: BOOL) -> windows::core::Result<()> {
        self.module.lock_server(flock.as_bool());
        Ok(())
    }
}

fn shell_change_notify() {
    use std::ptr::null_mut;
    use windows::Win32::UI::Shell::{SHChangeNotify, SHCNE_ASSOCCHANGED, SHCNF_IDLIST};
    unsafe { SHChangeNotify(SHCNE_ASSOCCHANGED, SHCNF_IDLIST, null_mut(), null_mut()) };
}

#[no_mangle]
#[allow(non_snake_case)]
#[doc(hidden)]
pub unsafe extern "system" fn DllGetClassObject(
    rclsid: *const GUID,
    riid: *const GUID,
    pout: *mut windows::core::RawPtr,
) -> HRESULT {
    if *rclsid != GUID::from_u128(CLSID_COMIC_THUMB_PROVIDER.to_u128()) {
        return CLASS_E_CLASSNOTAVAILABLE;
    }

    let factory = ShellClassFactory {
        module: MODULE.clone(),
    };
    let unknown: IUnknown = factory.into();
    unknown.query(&*riid, pout)
}

#[no_mangle]
#[allow(non_snake_case)]
#[doc(hidden)]
pub extern "system" fn DllCanUnloadNow() -> HRESULT {
    HRESULT(can_unload_now(&MODULE).0)
}

#[no_mangle]
#[allow(non_snake_case)]
#[doc(hidden)]
pub extern "stdcall" fn DllMain(
    dll_instance: HINSTANCE,
    reason: u32,
    _reserved: *mut core::ffi::c_void,
) -> bool {
    if reason == DLL_PROCESS_ATTACH {
        unsafe {
            DLL_INSTANCE = dll_instance;
            DisableThreadLibraryCalls(dll_instance);
        }
        let _ = eventlog::init(EVENT_SOURCE, log::Level::Info);
    }
    true
}

#[no_mangle]
#[allow(non_snake_case)]
#[doc(hidden)]
pub unsafe extern "system" fn DllRegisterServer() -> HRESULT {
    let module_path = match get_module_path(DLL_INSTANCE) {
        Ok(path) => path,
        Err(err) => return err,
    };
    if let Err(err) = eventlog::register(EVENT_SOURCE) {
        warn!(target: "ComicThumbsDll", "event source registration failed: {err}");
    }
    if register(&module_path).is_ok() {
        shell_change_notify();
        HRESULT(hresult::S_OK.0)
    } else {
        E_FAIL
    }
}

#[no_mangle]
#[allow(non_snake_case)]
#[doc(hidden)]
pub unsafe extern "system" fn DllUnregisterServer() -> HRESULT {
    let _ = eventlog::deregister(EVENT_SOURCE);
    if unregister().is_ok() {
        shell_change_notify();
        HRESULT(hresult::S_OK.0)
    } else {
        E_FAIL
    }
}

fn register(module_path: &str) -> std::io::Result<()> {
    for key in registration_keys(module_path) {
        let hkcr = RegKey::predef(HKEY_CLASSES_ROOT);
        let (regkey, _) = hkcr.create_subkey(key.path)?;
        for val in key.values {
            regkey.set_value(val.0, &val.1)?;
        }
    }
    Ok(())
}

fn unregister() -> std::io::Result<()> {
    let hkcr = RegKey::predef(HKEY_CLASSES_ROOT);
    for path in unregistration_paths() {
        hkcr.delete_subkey_all(path).ok();
    }
    Ok(())
}
