//! Process-wide registry for the host's socket protect function
//!
//! On Android the supported way to keep a socket out of the VPN is
//! `VpnService.protect(int)`. Setting the fwmark from inside the app fails
//! there, and the platform call ends up doing an IPC to another process
//! which sets the mark for us. The host bridge registers that call here and
//! every socket created by the client is handed to it through
//! [`crate::control::control`].
//!
//! Only one protect function is registered at a time. Registering replaces
//! the previous one and registering `None` disables protection.

use crate::error::Result;
use log::debug;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Native socket descriptor handed to protect functions
#[cfg(unix)]
pub type NativeSocket = std::os::unix::io::RawFd;

/// Native socket descriptor handed to protect functions
#[cfg(windows)]
pub type NativeSocket = std::os::windows::io::RawSocket;

/// Capability to exclude a socket from VPN routing
///
/// Implementations usually forward to the host environment, e.g.
/// `VpnService.protect(fd)` over JNI. Closures of the shape
/// `Fn(NativeSocket) -> Result<()>` implement this trait directly.
pub trait SocketProtector: Send + Sync {
    /// Ask the host to route `fd` around the tunnel.
    ///
    /// The descriptor is only valid for the duration of the call and must
    /// not be retained.
    fn protect(&self, fd: NativeSocket) -> Result<()>;
}

impl<F> SocketProtector for F
where
    F: Fn(NativeSocket) -> Result<()> + Send + Sync,
{
    fn protect(&self, fd: NativeSocket) -> Result<()> {
        self(fd)
    }
}

/// Shared handle to a registered protect function
pub type ProtectFunc = Arc<dyn SocketProtector>;

/// Single-slot, lock-guarded holder of an optional protect function
#[derive(Default)]
pub struct ProtectRegistry {
    slot: Mutex<Option<ProtectFunc>>,
}

impl ProtectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered function; `None` disables protection
    pub fn set(&self, func: Option<ProtectFunc>) {
        let previous = {
            // The slot holds a single Arc, so a panic elsewhere cannot leave it half-written.
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, func)
        };
        // Dropped outside the lock; the last reference may run host cleanup.
        drop(previous);
    }

    /// Currently registered function, if any
    pub fn get(&self) -> Option<ProtectFunc> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove the registered function
    pub fn clear(&self) {
        self.set(None);
    }

    /// Whether a function is currently registered
    pub fn is_set(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for ProtectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectRegistry")
            .field("registered", &self.is_set())
            .finish()
    }
}

// Shared between the host bridge and the dial path, which have no common caller
lazy_static::lazy_static! {
    static ref PROTECT_REGISTRY: ProtectRegistry = ProtectRegistry::new();
}

/// The process-wide registry used by [`crate::control::control`]
pub fn global() -> &'static ProtectRegistry {
    &PROTECT_REGISTRY
}

/// Register the function the host provides for protecting sockets.
///
/// A `None` function disables the hook.
pub fn set_protect_func(func: Option<ProtectFunc>) {
    match func {
        Some(_) => debug!("Socket protect function registered"),
        None => debug!("Socket protect function cleared"),
    }
    global().set(func);
}

/// Register a protector, replacing any previous one
pub fn set_protector<P>(protector: P)
where
    P: SocketProtector + 'static,
{
    set_protect_func(Some(Arc::new(protector)));
}

/// Disable socket protection
pub fn clear_protect_func() {
    set_protect_func(None);
}

/// The currently registered protect function, if any
pub fn protect_func() -> Option<ProtectFunc> {
    global().get()
}

/// Whether a protect function is currently registered
pub fn has_protect_func() -> bool {
    global().is_set()
}

/// Serialises tests that touch the process-wide registry and resets it.
#[cfg(test)]
pub(crate) fn lock_global_for_test() -> std::sync::MutexGuard<'static, ()> {
    static GLOBAL_TEST_LOCK: Mutex<()> = Mutex::new(());

    let guard = GLOBAL_TEST_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    clear_protect_func();
    guard
}
