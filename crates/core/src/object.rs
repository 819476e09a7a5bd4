//! Reference-counted object handles and capability negotiation.
//!
//! Every shell-visible object in this crate lives behind a [`ComRef`]:
//! a heap allocation carrying an atomic reference count that starts at
//! 1 for the creator. Cloning retains, dropping releases, and the
//! release that observes the count reach zero frees the object exactly
//! once. Holding the reference in a handle type makes a forgotten
//! release unrepresentable at call sites.

use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{fence, AtomicU32, Ordering};

use crate::guid::Guid;
use crate::hresult::{HResult, E_NOINTERFACE, E_POINTER, S_OK};

/// A class reachable through capability negotiation. `INTERFACES` is
/// the negotiation table: the interface identifiers this object
/// answers to. Every table starts with the generic identity id.
pub trait ComClass {
    const INTERFACES: &'static [Guid];
}

/// Marker for "some negotiable object", used where an API only needs
/// to know whether an outer aggregate was supplied.
pub trait ComIdentity {}

impl<T: ComClass> ComIdentity for ComRef<T> {}

struct ComBox<T> {
    refs: AtomicU32,
    value: T,
}

/// Owning handle to a reference-counted object.
pub struct ComRef<T: ComClass> {
    inner: NonNull<ComBox<T>>,
    _marker: PhantomData<ComBox<T>>,
}

unsafe impl<T: ComClass + Send + Sync> Send for ComRef<T> {}
unsafe impl<T: ComClass + Send + Sync> Sync for ComRef<T> {}

impl<T: ComClass> ComRef<T> {
    /// Allocates `value` with a reference count of 1 (the creator's
    /// implicit reference).
    pub fn new(value: T) -> Self {
        let boxed = Box::new(ComBox {
            refs: AtomicU32::new(1),
            value,
        });
        Self {
            inner: NonNull::from(Box::leak(boxed)),
            _marker: PhantomData,
        }
    }

    fn shared(&self) -> &ComBox<T> {
        // Valid while any handle is alive; we hold one.
        unsafe { self.inner.as_ref() }
    }

    /// Current reference count. Inherently racy under concurrent
    /// retains/releases; meant for tests and diagnostics.
    pub fn ref_count(&self) -> u32 {
        self.shared().refs.load(Ordering::SeqCst)
    }

    /// Takes an additional reference on the same object.
    pub fn retain(&self) -> Self {
        self.shared().refs.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: self.inner,
            _marker: PhantomData,
        }
    }

    /// Resolves `iid` against the object's negotiation table.
    ///
    /// A missing output slot fails with `E_POINTER` before any other
    /// work. An unknown identifier writes `None` into the slot and
    /// fails with `E_NOINTERFACE`. A known identifier writes a
    /// retained handle and succeeds.
    pub fn query_interface(&self, iid: &Guid, slot: Option<&mut Option<ComRef<T>>>) -> HResult {
        let Some(slot) = slot else {
            return E_POINTER;
        };
        if T::INTERFACES.contains(iid) {
            *slot = Some(self.retain());
            S_OK
        } else {
            *slot = None;
            E_NOINTERFACE
        }
    }
}

impl<T: ComClass> Clone for ComRef<T> {
    fn clone(&self) -> Self {
        self.retain()
    }
}

impl<T: ComClass> Deref for ComRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.shared().value
    }
}

impl<T: ComClass> Drop for ComRef<T> {
    fn drop(&mut self) {
        // Same protocol as Arc: Release on the decrement, Acquire
        // before the deallocation, so the thread that observes zero
        // sees every write made through other handles.
        if self.shared().refs.fetch_sub(1, Ordering::Release) == 1 {
            fence(Ordering::Acquire);
            unsafe { drop(Box::from_raw(self.inner.as_ptr())) };
        }
    }
}
