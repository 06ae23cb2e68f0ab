//! Rust VPNSE netns - socket protection hook for VPN clients
//!
//! A VPN client has to keep its own control and data sockets out of the
//! routes it installs, otherwise the tunnel's outgoing packets are sent back
//! into the tunnel. Where socket options cannot be set directly (Android's
//! `VpnService` being the main case), the host offers a per-socket
//! "protect" call instead. This library holds that call and applies it to
//! every socket the client dials or listens on.
//!
//! ## What This Library Provides
//! - A process-wide registry for the host's protect function
//! - A control hook for the dial/listen path that protects each new socket
//! - C FFI bindings so host bridges can register their protect callback
//! - TOML configuration and logging setup
//!
//! ## Usage
//! ```no_run
//! use rvpnse_netns::{control, set_protector, NativeSocket, Result};
//!
//! set_protector(|fd: NativeSocket| -> Result<()> {
//!     // forward to VpnService.protect(fd) here
//!     let _ = fd;
//!     Ok(())
//! });
//!
//! let socket = std::net::UdpSocket::bind("0.0.0.0:0")?;
//! control("udp", "0.0.0.0:0", &socket)?;
//! # Ok::<(), rvpnse_netns::VpnError>(())
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod logging;
pub mod protect;

// Re-export core types for static library interface
pub use config::{Config, LoggingConfig, ProtectConfig};
pub use control::{control, control_fn, control_passthrough, control_with, ControlFn, RawConn};
pub use error::{Result, VpnError};
pub use logging::init_logging;
pub use protect::{
    clear_protect_func, has_protect_func, protect_func, set_protect_func, set_protector,
    NativeSocket, ProtectFunc, ProtectRegistry, SocketProtector,
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// C FFI Interface for cross-platform integration
pub mod ffi;
