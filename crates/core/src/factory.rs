//! The class factory the host obtains through the class-object entry
//! point and uses to create provider instances.

use log::debug;

use crate::guid::{Guid, IID_ICLASS_FACTORY, IID_IUNKNOWN};
use crate::hresult::{HResult, CLASS_E_NOAGGREGATION, S_OK};
use crate::module::ModuleHandle;
use crate::object::{ComClass, ComIdentity, ComRef};
use crate::provider::ComicThumbProvider;

pub struct ClassFactory {
    module: ModuleHandle,
}

impl ComClass for ClassFactory {
    const INTERFACES: &'static [Guid] = &[IID_IUNKNOWN, IID_ICLASS_FACTORY];
}

impl ClassFactory {
    pub fn new(module: ModuleHandle) -> ComRef<Self> {
        ComRef::new(Self { module })
    }

    /// Constructs a provider and negotiates `iid` on it.
    ///
    /// Aggregation is not supported: a non-null `outer` fails before
    /// anything is constructed. The factory's transient reference to
    /// the new instance is dropped whether or not negotiation
    /// succeeds, so a probing host leaks nothing.
    pub fn create_instance(
        &self,
        outer: Option<&dyn ComIdentity>,
        iid: &Guid,
        slot: Option<&mut Option<ComRef<ComicThumbProvider>>>,
    ) -> HResult {
        if outer.is_some() {
            return CLASS_E_NOAGGREGATION;
        }
        debug!(target: "ClassFactory", "create_instance iid={iid}");
        let provider = ComicThumbProvider::new(self.module.clone());
        provider.query_interface(iid, slot)
        // `provider` drops here; on failed negotiation that release
        // destroys the instance.
    }

    /// Adjusts the module-wide lock count. Never fails.
    pub fn lock_server(&self, lock: bool) -> HResult {
        self.module.lock_server(lock);
        S_OK
    }
}
