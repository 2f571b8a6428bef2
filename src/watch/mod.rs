//! Watch set management
//!
//! Subscribing resolves a token through the price source, then seeds its
//! baseline and watch entry under a per-asset lock shared with the monitor.

mod locks;
mod service;
mod types;

pub use locks::AssetLocks;
pub use service::{SubscribeError, WatchService, WatchedAsset};
pub use types::{AssetId, InvalidAssetId, Subscriber};
