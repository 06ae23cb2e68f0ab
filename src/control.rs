//! Dial/listen control hook that protects every socket the client creates
//!
//! The networking stack calls the hook right after creating a socket and
//! before it is connected or bound. The hook borrows the native descriptor
//! through [`RawConn::control`] and, while it is borrowed, hands it to the
//! registered protect function.

use crate::config::ProtectConfig;
use crate::error::{Result, VpnError};
use crate::protect::{self, NativeSocket, ProtectRegistry};
use log::{trace, warn};
use std::io;

/// Scoped access to the native descriptor of a socket that is being set up
pub trait RawConn {
    /// Run `f` with the native descriptor.
    ///
    /// The descriptor is only valid inside `f`. Fails when the descriptor
    /// can no longer be reached, e.g. the connection was already closed.
    fn control(&self, f: &mut dyn FnMut(NativeSocket)) -> io::Result<()>;

    /// Concrete type name used when reporting access failures
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(unix)]
impl<T> RawConn for T
where
    T: std::os::unix::io::AsRawFd + ?Sized,
{
    fn control(&self, f: &mut dyn FnMut(NativeSocket)) -> io::Result<()> {
        f(self.as_raw_fd());
        Ok(())
    }
}

#[cfg(windows)]
impl<T> RawConn for T
where
    T: std::os::windows::io::AsRawSocket + ?Sized,
{
    fn control(&self, f: &mut dyn FnMut(NativeSocket)) -> io::Result<()> {
        f(self.as_raw_socket());
        Ok(())
    }
}

/// Signature shared by dial and listen control hooks
pub type ControlFn = fn(&str, &str, &dyn RawConn) -> Result<()>;

/// Control hook for the configured protection mode
pub fn control_fn(config: &ProtectConfig) -> ControlFn {
    if config.enabled {
        control
    } else {
        control_passthrough
    }
}

/// Protects the socket behind `conn` with the process-wide protect function.
///
/// Same shape as the dialer and listener control hooks. `network` and
/// `address` are not inspected.
pub fn control(network: &str, address: &str, conn: &dyn RawConn) -> Result<()> {
    control_with(protect::global(), network, address, conn)
}

/// Like [`control`], reading the protect function from `registry`
pub fn control_with(
    registry: &ProtectRegistry,
    network: &str,
    address: &str,
    conn: &dyn RawConn,
) -> Result<()> {
    let mut sock_result: Result<()> = Ok(());

    let access = conn.control(&mut |fd: NativeSocket| {
        if let Some(protector) = registry.get() {
            trace!("Protecting fd {fd} for {network} {address}");
            sock_result = protector.protect(fd);
        }
    });

    if let Err(source) = access {
        let err = VpnError::RawConnControl {
            conn_type: conn.type_name(),
            source,
        };
        warn!("{err}");
        return Err(err);
    }

    if let Err(e) = &sock_result {
        warn!("Failed to protect socket for {network} {address}: {e}");
    }
    sock_result
}

/// Control hook used when protection is disabled.
///
/// Still borrows the descriptor so unusable connections are reported the
/// same way, but never calls the protect function.
pub fn control_passthrough(_network: &str, _address: &str, conn: &dyn RawConn) -> Result<()> {
    conn.control(&mut |_fd: NativeSocket| {}).map_err(|source| {
        let err = VpnError::RawConnControl {
            conn_type: conn.type_name(),
            source,
        };
        warn!("{err}");
        err
    })
}
