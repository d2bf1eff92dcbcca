pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::ShimConfig;

pub use crate::adapters::native::DynamicBinding;
pub use crate::core::callbacks::{CallbackHandle, CallbackRegistry};
pub use crate::core::client::{Client, Steamworks};
pub use crate::core::overlay::{Overlay, OverlayOptions, SwitchProfile};
pub use crate::core::platform::PlatformArtifact;
pub use crate::domain::model::{
    AppId, CallbackEvent, Friend, FriendFlags, ScreenshotHandle, SteamCallback, SteamId,
};
pub use crate::utils::error::{Result, ShimError};
