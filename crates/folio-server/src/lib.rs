//! Development server with live reload for folio sites.
//!
//! Builds the site, serves the output directory, and rebuilds on every change
//! to the input directory, telling connected browsers to reload over a WebSocket.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
