//! C FFI Interface for the socket protection hook
//!
//! Host bridges (JNI on Android, Swift on Apple platforms, plain C) use these
//! functions to register the platform's protect call and to protect sockets
//! they create themselves.

#![allow(clippy::missing_safety_doc)]

use std::ffi::{c_void, CStr};
use std::os::raw::{c_char, c_int};
use std::sync::Arc;

use crate::config::LoggingConfig;
use crate::control;
use crate::error::{IntoVpnError, Result};
use crate::logging::init_logging;
use crate::protect::{self, NativeSocket, SocketProtector};
use crate::VpnError;

/// Error codes returned by C FFI functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VPNSEError {
    Success = 0,
    InvalidConfig = 1,
    InvalidParameter = 5,
    ProtectFailed = 8,
    SocketAccessFailed = 9,
    InternalError = 99,
}

impl From<VpnError> for VPNSEError {
    fn from(error: VpnError) -> Self {
        match error {
            VpnError::Config(_) => VPNSEError::InvalidConfig,
            VpnError::Protect(_) => VPNSEError::ProtectFailed,
            VpnError::RawConnControl { .. } => VPNSEError::SocketAccessFailed,
            _ => VPNSEError::InternalError,
        }
    }
}

/// Host protect callback.
///
/// Returns 0 when the socket was protected, any other value on failure.
pub type ProtectCallback = unsafe extern "C" fn(fd: NativeSocket, user_data: *mut c_void) -> c_int;

/// Called once with `user_data` when no protect call can use it any more
pub type ReleaseCallback = unsafe extern "C" fn(user_data: *mut c_void);

/// Protector that forwards to a host callback
struct HostProtector {
    callback: ProtectCallback,
    user_data: *mut c_void,
    release: Option<ReleaseCallback>,
}

// `user_data` stays valid and usable from any thread until `release` runs.
unsafe impl Send for HostProtector {}
unsafe impl Sync for HostProtector {}

impl Drop for HostProtector {
    fn drop(&mut self) {
        // Runs after the last in-flight protect call has returned.
        if let Some(release) = self.release {
            unsafe { release(self.user_data) }
        }
    }
}

impl SocketProtector for HostProtector {
    fn protect(&self, fd: NativeSocket) -> Result<()> {
        let code = unsafe { (self.callback)(fd, self.user_data) };
        if code == 0 {
            Ok(())
        } else {
            Err(VpnError::Protect(format!(
                "host callback returned {code} for fd {fd}"
            )))
        }
    }
}

/// Register the host's socket protect callback
///
/// # Parameters
/// - `callback`: Function asking the host to protect a descriptor, or null to
///   disable protection
/// - `user_data`: Opaque pointer passed back to every callback invocation
/// - `release`: Optional function receiving `user_data` once it is no longer
///   used, or null. With a null `callback` it is called right away.
///
/// Replacing or clearing the callback does not wait for protect calls that
/// are already running; they finish with the previous `callback` and
/// `user_data`. The host must keep `user_data` alive until `release` is
/// called with it, which happens after the last of those calls returns.
/// Without a `release` function `user_data` must outlive every socket the
/// library may still be protecting.
///
/// # Returns
/// - 0 on success
#[no_mangle]
pub unsafe extern "C" fn vpnse_set_protect_callback(
    callback: Option<ProtectCallback>,
    user_data: *mut c_void,
    release: Option<ReleaseCallback>,
) -> c_int {
    match callback {
        Some(callback) => protect::set_protect_func(Some(Arc::new(HostProtector {
            callback,
            user_data,
            release,
        }))),
        None => {
            protect::clear_protect_func();
            // Nothing was registered with this pointer; hand it straight back.
            if let Some(release) = release {
                release(user_data);
            }
        }
    }
    VPNSEError::Success as c_int
}

/// Check whether a protect callback is registered
///
/// # Returns
/// - 1 if registered, 0 otherwise
#[no_mangle]
pub extern "C" fn vpnse_has_protect_callback() -> c_int {
    c_int::from(protect::has_protect_func())
}

/// Protect a socket created by the host
///
/// # Parameters
/// - `fd`: Open socket descriptor owned by the caller
///
/// # Returns
/// - 0 on success, or when no callback is registered
/// - Error code on failure
#[no_mangle]
pub unsafe extern "C" fn vpnse_protect_socket(fd: NativeSocket) -> c_int {
    #[cfg(unix)]
    let conn = {
        if fd < 0 {
            return VPNSEError::InvalidParameter as c_int;
        }
        std::os::fd::BorrowedFd::borrow_raw(fd)
    };

    #[cfg(windows)]
    let conn = {
        if fd == NativeSocket::MAX {
            return VPNSEError::InvalidParameter as c_int;
        }
        std::os::windows::io::BorrowedSocket::borrow_raw(fd)
    };

    match control::control("host", "", &conn) {
        Ok(()) => VPNSEError::Success as c_int,
        Err(err) => VPNSEError::from(err) as c_int,
    }
}

/// Initialise logging
///
/// # Parameters
/// - `level`: Log level name (`error`, `warn`, `info`, `debug`, `trace`,
///   `off`), or null for `info`
///
/// # Returns
/// - 0 on success
/// - Error code on failure
#[no_mangle]
pub unsafe extern "C" fn vpnse_init_logging(level: *const c_char) -> c_int {
    let config = if level.is_null() {
        LoggingConfig::default()
    } else {
        match CStr::from_ptr(level).to_str().into_vpn_error("log level") {
            Ok(level) => LoggingConfig {
                level: level.to_string(),
            },
            Err(_) => return VPNSEError::InvalidParameter as c_int,
        }
    };

    match init_logging(&config) {
        Ok(()) => VPNSEError::Success as c_int,
        Err(err) => VPNSEError::from(err) as c_int,
    }
}

/// Get library version string
///
/// # Returns
/// - Null-terminated version string (statically allocated)
#[no_mangle]
pub extern "C" fn vpnse_version() -> *const c_char {
    static VERSION_CSTR: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION_CSTR.as_ptr() as *const c_char
}
