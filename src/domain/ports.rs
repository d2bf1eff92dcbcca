use crate::domain::model::{
    AppId, CallbackEvent, Friend, FriendFlags, ScreenshotHandle, SteamId,
};
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Client API of the prebuilt native SDK binding.
pub trait NativeBinding: Send + Sync {
    /// Without an app id the SDK looks for `steam_appid.txt`.
    fn init(&self, app_id: Option<AppId>) -> Result<()>;

    /// Pumps the SDK's queue and returns the callbacks it produced.
    fn run_callbacks(&self) -> Result<Vec<CallbackEvent>>;

    fn restart_app_if_necessary(&self, app_id: AppId) -> bool;

    fn friends(&self, flags: FriendFlags) -> Result<Vec<Friend>>;
    fn friend_persona_name(&self, steam_id: SteamId) -> Result<String>;

    fn hook_screenshots(&self, hook: bool) -> Result<()>;
    fn is_screenshots_hooked(&self) -> Result<bool>;
    fn trigger_screenshot(&self) -> Result<()>;
    fn add_screenshot_to_library(
        &self,
        filename: &Path,
        thumbnail: Option<&Path>,
        width: i32,
        height: i32,
    ) -> Result<ScreenshotHandle>;
}

pub type WindowCreatedHandler = Box<dyn Fn(Arc<dyn ShellWindow>) + Send + Sync>;
pub type WindowClosedHandler = Box<dyn FnOnce() + Send>;

/// The desktop application shell hosting the overlay.
pub trait HostShell: Send + Sync {
    fn is_ready(&self) -> bool;
    fn append_switch(&self, switch: &str, value: Option<&str>) -> Result<()>;
    fn windows(&self) -> Vec<Arc<dyn ShellWindow>>;
    fn on_window_created(&self, handler: WindowCreatedHandler) -> Result<()>;
}

pub trait ShellWindow: Send + Sync {
    fn id(&self) -> u64;
    fn is_destroyed(&self) -> bool;
    fn is_visible(&self) -> bool;
    fn contents(&self) -> Option<Arc<dyn WebContents>>;
    /// Fires at most once, when the window closes.
    fn on_closed(&self, handler: WindowClosedHandler) -> Result<()>;
}

pub trait WebContents: Send + Sync {
    fn is_painting(&self) -> bool;
    fn invalidate(&self) -> Result<()>;
}
