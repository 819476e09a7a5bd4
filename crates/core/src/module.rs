//! Process-wide module state and the in-process server entry logic.
//!
//! The state behind `DllCanUnloadNow` and `LockServer` is not ambient:
//! the hosting layer creates one [`ModuleHandle`] when the module
//! loads and passes it into every entry point and factory.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::debug;

use crate::factory::ClassFactory;
use crate::guid::Guid;
use crate::hresult::{HResult, CLASS_E_CLASSNOTAVAILABLE, S_FALSE, S_OK};
use crate::object::ComRef;
use crate::CLSID_COMIC_THUMB_PROVIDER;

#[derive(Default)]
struct ModuleState {
    lock_count: AtomicU32,
    live_instances: AtomicU32,
}

/// Cloneable handle to the module-wide counters, shared by every
/// factory and provider the module hands out.
#[derive(Clone, Default)]
pub struct ModuleHandle(Arc<ModuleState>);

impl ModuleHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// `LockServer` backing: an explicit host request to keep the
    /// module resident (or drop that request again). Never fails; an
    /// unbalanced unlock leaves the count at zero instead of wrapping.
    pub fn lock_server(&self, lock: bool) {
        if lock {
            self.0.lock_count.fetch_add(1, Ordering::SeqCst);
        } else {
            let _ = self
                .0
                .lock_count
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        }
    }

    pub fn lock_count(&self) -> u32 {
        self.0.lock_count.load(Ordering::SeqCst)
    }

    /// Number of provider instances currently alive. Tracked for
    /// diagnostics; the unload check deliberately ignores it.
    pub fn live_instances(&self) -> u32 {
        self.0.live_instances.load(Ordering::SeqCst)
    }

    pub(crate) fn instance_created(&self) {
        self.0.live_instances.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn instance_dropped(&self) {
        self.0.live_instances.fetch_sub(1, Ordering::SeqCst);
    }
}

/// `DllGetClassObject` behavior: resolve a class id to its factory
/// and negotiate the requested facet on it.
pub fn get_class_object(
    module: &ModuleHandle,
    clsid: &Guid,
    iid: &Guid,
    slot: Option<&mut Option<ComRef<ClassFactory>>>,
) -> HResult {
    if *clsid != CLSID_COMIC_THUMB_PROVIDER {
        return CLASS_E_CLASSNOTAVAILABLE;
    }
    debug!(target: "ComicThumbModule", "class object requested, iid={iid}");
    let factory = ClassFactory::new(module.clone());
    factory.query_interface(iid, slot)
}

/// `DllCanUnloadNow` behavior: only explicit server locks keep the
/// module resident. Live instances are not consulted.
pub fn can_unload_now(module: &ModuleHandle) -> HResult {
    if module.lock_count() == 0 {
        S_OK
    } else {
        S_FALSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::{IID_ICLASS_FACTORY, IID_ITHUMBNAIL_PROVIDER, IID_IUNKNOWN};
    use crate::hresult::E_NOINTERFACE;

    #[test]
    fn unknown_clsid_is_not_available() {
        let module = ModuleHandle::new();
        let other = Guid::from_u128(0x01234567_89ab_cdef_0123_456789abcdef);
        let mut slot = None;
        assert_eq!(
            get_class_object(&module, &other, &IID_ICLASS_FACTORY, Some(&mut slot)),
            CLASS_E_CLASSNOTAVAILABLE
        );
        assert!(slot.is_none());
    }

    #[test]
    fn class_object_answers_the_identity_facet() {
        let module = ModuleHandle::new();
        let mut slot = None;
        assert_eq!(
            get_class_object(
                &module,
                &CLSID_COMIC_THUMB_PROVIDER,
                &IID_IUNKNOWN,
                Some(&mut slot)
            ),
            S_OK
        );
        assert!(slot.is_some(), "identity is part of the factory's table");
    }

    #[test]
    fn clsid_is_checked_before_the_requested_facet() {
        let module = ModuleHandle::new();
        let other = Guid::from_u128(0x01234567_89ab_cdef_0123_456789abcdef);
        let mut slot = None;
        assert_eq!(
            get_class_object(&module, &other, &IID_IUNKNOWN, Some(&mut slot)),
            CLASS_E_CLASSNOTAVAILABLE,
            "unknown class wins over any facet question"
        );
        assert!(slot.is_none());
    }

    #[test]
    fn factory_facet_is_negotiated_on_the_class_object() {
        let module = ModuleHandle::new();
        let mut slot = None;
        assert_eq!(
            get_class_object(
                &module,
                &CLSID_COMIC_THUMB_PROVIDER,
                &IID_ICLASS_FACTORY,
                Some(&mut slot)
            ),
            S_OK
        );
        let factory = slot.expect("factory handle");
        assert_eq!(factory.ref_count(), 1, "only the negotiated reference survives");

        let mut wrong = None;
        assert_eq!(
            get_class_object(
                &module,
                &CLSID_COMIC_THUMB_PROVIDER,
                &IID_ITHUMBNAIL_PROVIDER,
                Some(&mut wrong)
            ),
            E_NOINTERFACE
        );
        assert!(wrong.is_none());
    }

    #[test]
    fn unload_tracks_the_lock_count_only() {
        let module = ModuleHandle::new();
        assert_eq!(can_unload_now(&module), S_OK);

        module.lock_server(true);
        module.lock_server(true);
        assert_eq!(can_unload_now(&module), S_FALSE);

        module.lock_server(false);
        assert_eq!(can_unload_now(&module), S_FALSE);
        module.lock_server(false);
        assert_eq!(can_unload_now(&module), S_OK);
    }

    #[test]
    fn unbalanced_unlock_saturates_at_zero() {
        let module = ModuleHandle::new();
        module.lock_server(false);
        assert_eq!(module.lock_count(), 0);
        assert_eq!(can_unload_now(&module), S_OK);

        module.lock_server(true);
        assert_eq!(module.lock_count(), 1);
        assert_eq!(can_unload_now(&module), S_FALSE);
    }
}
