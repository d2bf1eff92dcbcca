pub mod callbacks;
pub mod client;
pub mod friends;
pub mod overlay;
pub mod platform;
pub mod pump;
pub mod screenshots;

pub use crate::domain::model::{
    AppId, CallbackEvent, Friend, FriendFlags, ScreenshotHandle, SteamCallback, SteamId,
};
pub use crate::domain::ports::{HostShell, NativeBinding, ShellWindow, WebContents};
pub use crate::utils::error::Result;
