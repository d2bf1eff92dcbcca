#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use steamworks_shim::domain::ports::{
    HostShell, NativeBinding, ShellWindow, WebContents, WindowClosedHandler, WindowCreatedHandler,
};
use steamworks_shim::{
    AppId, CallbackEvent, Friend, FriendFlags, Result, ScreenshotHandle, ShimError, SteamId,
};

// ─── Native binding ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockBinding {
    pub init_calls: Mutex<Vec<Option<AppId>>>,
    pub fail_init: AtomicBool,
    pub run_calls: AtomicUsize,
    pub restart_calls: AtomicUsize,
    pub restart_answer: AtomicBool,
    pub pending: Mutex<VecDeque<CallbackEvent>>,
    pub friends: Vec<Friend>,
    pub hooked: AtomicBool,
    pub triggered: AtomicUsize,
    pub added: Mutex<Vec<(PathBuf, Option<PathBuf>, i32, i32)>>,
    pub next_handle: Mutex<u32>,
}

impl MockBinding {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with_friends(Vec::new()))
    }

    pub fn with_friends(friends: Vec<Friend>) -> Self {
        Self {
            friends,
            next_handle: Mutex::new(1),
            ..Default::default()
        }
    }

    pub fn queue(&self, event: CallbackEvent) {
        self.pending.lock().push_back(event);
    }

    pub fn run_count(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }
}

impl NativeBinding for MockBinding {
    fn init(&self, app_id: Option<AppId>) -> Result<()> {
        self.init_calls.lock().push(app_id);
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(ShimError::InitFailed {
                code: 2,
                message: "Steam client is not running".to_string(),
            });
        }
        Ok(())
    }

    fn run_callbacks(&self) -> Result<Vec<CallbackEvent>> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pending.lock().drain(..).collect())
    }

    fn restart_app_if_necessary(&self, _app_id: AppId) -> bool {
        self.restart_calls.fetch_add(1, Ordering::SeqCst);
        self.restart_answer.load(Ordering::SeqCst)
    }

    fn friends(&self, flags: FriendFlags) -> Result<Vec<Friend>> {
        if flags.intersects(FriendFlags::IMMEDIATE) {
            Ok(self.friends.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn friend_persona_name(&self, steam_id: SteamId) -> Result<String> {
        Ok(self
            .friends
            .iter()
            .find(|f| f.steam_id == steam_id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "[unknown]".to_string()))
    }

    fn hook_screenshots(&self, hook: bool) -> Result<()> {
        self.hooked.store(hook, Ordering::SeqCst);
        Ok(())
    }

    fn is_screenshots_hooked(&self) -> Result<bool> {
        Ok(self.hooked.load(Ordering::SeqCst))
    }

    fn trigger_screenshot(&self) -> Result<()> {
        self.triggered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn add_screenshot_to_library(
        &self,
        filename: &Path,
        thumbnail: Option<&Path>,
        width: i32,
        height: i32,
    ) -> Result<ScreenshotHandle> {
        self.added.lock().push((
            filename.to_path_buf(),
            thumbnail.map(Path::to_path_buf),
            width,
            height,
        ));
        let mut next = self.next_handle.lock();
        let handle = ScreenshotHandle(*next);
        *next += 1;
        Ok(handle)
    }
}

// ─── Host shell ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockContents {
    pub painting: AtomicBool,
    pub invalidations: AtomicUsize,
    pub fail: AtomicBool,
}

impl WebContents for MockContents {
    fn is_painting(&self) -> bool {
        self.painting.load(Ordering::SeqCst)
    }

    fn invalidate(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ShimError::Shell {
                message: "compositor busy".to_string(),
            });
        }
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockWindow {
    pub id: u64,
    pub destroyed: AtomicBool,
    pub visible: AtomicBool,
    pub contents: Option<Arc<MockContents>>,
    pub closed_handler: Mutex<Option<WindowClosedHandler>>,
    pub closed_registrations: AtomicUsize,
}

impl MockWindow {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            destroyed: AtomicBool::new(false),
            visible: AtomicBool::new(true),
            contents: Some(Arc::new(MockContents::default())),
            closed_handler: Mutex::new(None),
            closed_registrations: AtomicUsize::new(0),
        })
    }

    pub fn without_contents(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            destroyed: AtomicBool::new(false),
            visible: AtomicBool::new(true),
            contents: None,
            closed_handler: Mutex::new(None),
            closed_registrations: AtomicUsize::new(0),
        })
    }

    pub fn invalidations(&self) -> usize {
        self.contents
            .as_ref()
            .map_or(0, |c| c.invalidations.load(Ordering::SeqCst))
    }

    /// Emits the `closed` lifecycle event and marks the window destroyed.
    pub fn close(&self) {
        let handler = self.closed_handler.lock().take();
        if let Some(handler) = handler {
            handler();
        }
        self.destroyed.store(true, Ordering::SeqCst);
    }

    /// Destroys the window without emitting `closed`.
    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

impl ShellWindow for MockWindow {
    fn id(&self) -> u64 {
        self.id
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn contents(&self) -> Option<Arc<dyn WebContents>> {
        self.contents
            .as_ref()
            .map(|c| Arc::clone(c) as Arc<dyn WebContents>)
    }

    fn on_closed(&self, handler: WindowClosedHandler) -> Result<()> {
        self.closed_registrations.fetch_add(1, Ordering::SeqCst);
        *self.closed_handler.lock() = Some(handler);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockShell {
    pub ready: AtomicBool,
    pub switches: Mutex<Vec<(String, Option<String>)>>,
    pub fail_switch: Mutex<Option<String>>,
    pub fail_listener: AtomicBool,
    pub windows: Mutex<Vec<Arc<MockWindow>>>,
    pub created_handlers: Mutex<Vec<WindowCreatedHandler>>,
}

impl MockShell {
    pub fn ready() -> Arc<Self> {
        let shell = Self::default();
        shell.ready.store(true, Ordering::SeqCst);
        Arc::new(shell)
    }

    pub fn not_ready() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_existing(&self, window: Arc<MockWindow>) {
        self.windows.lock().push(window);
    }

    /// Opens a new window and fires the window-created hooks.
    pub fn open(&self, window: Arc<MockWindow>) {
        self.windows.lock().push(Arc::clone(&window));
        let handlers = self.created_handlers.lock();
        for handler in handlers.iter() {
            handler(Arc::clone(&window) as Arc<dyn ShellWindow>);
        }
    }

    pub fn switch_names(&self) -> Vec<String> {
        self.switches.lock().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn listener_count(&self) -> usize {
        self.created_handlers.lock().len()
    }
}

impl HostShell for MockShell {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn append_switch(&self, switch: &str, value: Option<&str>) -> Result<()> {
        if self.fail_switch.lock().as_deref() == Some(switch) {
            return Err(ShimError::Shell {
                message: format!("cannot append {}", switch),
            });
        }
        self.switches
            .lock()
            .push((switch.to_string(), value.map(str::to_string)));
        Ok(())
    }

    fn windows(&self) -> Vec<Arc<dyn ShellWindow>> {
        self.windows
            .lock()
            .iter()
            .map(|w| Arc::clone(w) as Arc<dyn ShellWindow>)
            .collect()
    }

    fn on_window_created(&self, handler: WindowCreatedHandler) -> Result<()> {
        if self.fail_listener.load(Ordering::SeqCst) {
            return Err(ShimError::Shell {
                message: "listener registration refused".to_string(),
            });
        }
        self.created_handlers.lock().push(handler);
        Ok(())
    }
}
