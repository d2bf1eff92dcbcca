//! Binding over the Steamworks flat C API, loaded at runtime from the
//! platform's redistributable library.
//!
//! Callbacks use manual dispatch: every pump tick runs a frame on the SDK's
//! pipe and drains the queued messages into [`CallbackEvent`]s.

use crate::domain::model::{
    AppId, CallbackEvent, Friend, FriendFlags, ScreenshotHandle, SteamCallback, SteamId,
};
use crate::domain::ports::NativeBinding;
use crate::utils::error::{Result, ShimError};
use libloading::Library;
use parking_lot::Mutex;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::path::{Path, PathBuf};

type HSteamPipe = i32;
type SteamErrMsg = [c_char; 1024];

#[repr(C)]
struct CallbackMsg {
    steam_user: i32,
    callback: c_int,
    param: *mut u8,
    param_size: c_int,
}

impl CallbackMsg {
    fn empty() -> Self {
        Self {
            steam_user: 0,
            callback: 0,
            param: std::ptr::null_mut(),
            param_size: 0,
        }
    }
}

struct FlatApi {
    init_flat: unsafe extern "C" fn(*mut SteamErrMsg) -> c_int,
    shutdown: unsafe extern "C" fn(),
    restart_app_if_necessary: unsafe extern "C" fn(u32) -> bool,
    get_pipe: unsafe extern "C" fn() -> HSteamPipe,
    dispatch_init: unsafe extern "C" fn(),
    dispatch_run_frame: unsafe extern "C" fn(HSteamPipe),
    dispatch_next: unsafe extern "C" fn(HSteamPipe, *mut CallbackMsg) -> bool,
    dispatch_free_last: unsafe extern "C" fn(HSteamPipe),
    friends: unsafe extern "C" fn() -> *mut c_void,
    friend_count: unsafe extern "C" fn(*mut c_void, c_int) -> c_int,
    friend_by_index: unsafe extern "C" fn(*mut c_void, c_int, c_int) -> u64,
    friend_persona_name: unsafe extern "C" fn(*mut c_void, u64) -> *const c_char,
    screenshots: unsafe extern "C" fn() -> *mut c_void,
    hook_screenshots: unsafe extern "C" fn(*mut c_void, bool),
    is_screenshots_hooked: unsafe extern "C" fn(*mut c_void) -> bool,
    trigger_screenshot: unsafe extern "C" fn(*mut c_void),
    add_screenshot_to_library:
        unsafe extern "C" fn(*mut c_void, *const c_char, *const c_char, c_int, c_int) -> u32,
}

/// Copies a function pointer out of the library.
///
/// # Safety
///
/// `T` must match the exported symbol's real signature.
unsafe fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T> {
    let sym = unsafe { library.get::<T>(name.as_bytes()) }
        .map_err(|source| ShimError::MissingSymbol { symbol: name, source })?;
    Ok(*sym)
}

impl FlatApi {
    unsafe fn resolve(library: &Library) -> Result<Self> {
        unsafe {
            Ok(Self {
                init_flat: symbol(library, "SteamAPI_InitFlat")?,
                shutdown: symbol(library, "SteamAPI_Shutdown")?,
                restart_app_if_necessary: symbol(library, "SteamAPI_RestartAppIfNecessary")?,
                get_pipe: symbol(library, "SteamAPI_GetHSteamPipe")?,
                dispatch_init: symbol(library, "SteamAPI_ManualDispatch_Init")?,
                dispatch_run_frame: symbol(library, "SteamAPI_ManualDispatch_RunFrame")?,
                dispatch_next: symbol(library, "SteamAPI_ManualDispatch_GetNextCallback")?,
                dispatch_free_last: symbol(library, "SteamAPI_ManualDispatch_FreeLastCallback")?,
                friends: symbol(library, "SteamAPI_SteamFriends_v017")?,
                friend_count: symbol(library, "SteamAPI_ISteamFriends_GetFriendCount")?,
                friend_by_index: symbol(library, "SteamAPI_ISteamFriends_GetFriendByIndex")?,
                friend_persona_name: symbol(library, "SteamAPI_ISteamFriends_GetFriendPersonaName")?,
                screenshots: symbol(library, "SteamAPI_SteamScreenshots_v003")?,
                hook_screenshots: symbol(library, "SteamAPI_ISteamScreenshots_HookScreenshots")?,
                is_screenshots_hooked: symbol(
                    library,
                    "SteamAPI_ISteamScreenshots_IsScreenshotsHooked",
                )?,
                trigger_screenshot: symbol(library, "SteamAPI_ISteamScreenshots_TriggerScreenshot")?,
                add_screenshot_to_library: symbol(
                    library,
                    "SteamAPI_ISteamScreenshots_AddScreenshotToLibrary",
                )?,
            })
        }
    }
}

pub struct DynamicBinding {
    api: FlatApi,
    pipe: Mutex<Option<HSteamPipe>>,
    path: PathBuf,
    // Declared last so the function pointers above never outlive it.
    _library: Library,
}

impl DynamicBinding {
    pub fn open(path: &Path) -> Result<Self> {
        let library = unsafe { Library::new(path) }.map_err(|source| ShimError::ArtifactLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let api = unsafe { FlatApi::resolve(&library)? };
        tracing::debug!("Resolved Steam flat API from {}", path.display());

        Ok(Self {
            api,
            pipe: Mutex::new(None),
            path: path.to_path_buf(),
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pipe(&self) -> Result<HSteamPipe> {
        (*self.pipe.lock()).ok_or(ShimError::NotInitialized)
    }

    fn friends_ptr(&self) -> Result<*mut c_void> {
        self.pipe()?;
        let ptr = unsafe { (self.api.friends)() };
        if ptr.is_null() {
            return Err(ShimError::NotInitialized);
        }
        Ok(ptr)
    }

    fn screenshots_ptr(&self) -> Result<*mut c_void> {
        self.pipe()?;
        let ptr = unsafe { (self.api.screenshots)() };
        if ptr.is_null() {
            return Err(ShimError::NotInitialized);
        }
        Ok(ptr)
    }
}

fn c_path(path: &Path) -> Result<CString> {
    CString::new(path.to_string_lossy().into_owned()).map_err(|_| ShimError::Screenshot {
        message: format!("path contains a NUL byte: {}", path.display()),
    })
}

impl NativeBinding for DynamicBinding {
    fn init(&self, app_id: Option<AppId>) -> Result<()> {
        if let Some(id) = app_id {
            // Read by the SDK in place of steam_appid.txt.
            std::env::set_var("SteamAppId", id.to_string());
            std::env::set_var("SteamGameId", id.to_string());
        }

        let mut err: SteamErrMsg = [0; 1024];
        let code = unsafe { (self.api.init_flat)(&mut err) };
        if code != 0 {
            let message = unsafe { CStr::from_ptr(err.as_ptr()) }
                .to_string_lossy()
                .into_owned();
            return Err(ShimError::InitFailed { code, message });
        }

        let pipe = unsafe {
            (self.api.dispatch_init)();
            (self.api.get_pipe)()
        };
        *self.pipe.lock() = Some(pipe);
        Ok(())
    }

    fn run_callbacks(&self) -> Result<Vec<CallbackEvent>> {
        let pipe = self.pipe()?;
        let mut events = Vec::new();
        let mut msg = CallbackMsg::empty();

        unsafe {
            (self.api.dispatch_run_frame)(pipe);
            while (self.api.dispatch_next)(pipe, &mut msg) {
                if let Some(kind) = SteamCallback::from_id(msg.callback) {
                    let data = if msg.param.is_null() || msg.param_size <= 0 {
                        Vec::new()
                    } else {
                        std::slice::from_raw_parts(msg.param, msg.param_size as usize).to_vec()
                    };
                    events.push(CallbackEvent::new(kind, data));
                } else {
                    tracing::trace!("Skipping callback {} for user {}", msg.callback, msg.steam_user);
                }
                (self.api.dispatch_free_last)(pipe);
            }
        }

        Ok(events)
    }

    fn restart_app_if_necessary(&self, app_id: AppId) -> bool {
        unsafe { (self.api.restart_app_if_necessary)(app_id.0) }
    }

    fn friends(&self, flags: FriendFlags) -> Result<Vec<Friend>> {
        let ptr = self.friends_ptr()?;
        let raw_flags = c_int::from(flags.bits());
        let count = unsafe { (self.api.friend_count)(ptr, raw_flags) };

        let mut friends = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let steam_id = SteamId(unsafe { (self.api.friend_by_index)(ptr, index, raw_flags) });
            friends.push(Friend {
                steam_id,
                name: self.friend_persona_name(steam_id)?,
            });
        }
        Ok(friends)
    }

    fn friend_persona_name(&self, steam_id: SteamId) -> Result<String> {
        let ptr = self.friends_ptr()?;
        let name = unsafe { (self.api.friend_persona_name)(ptr, steam_id.raw()) };
        if name.is_null() {
            return Ok(String::new());
        }
        Ok(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
    }

    fn hook_screenshots(&self, hook: bool) -> Result<()> {
        let ptr = self.screenshots_ptr()?;
        unsafe { (self.api.hook_screenshots)(ptr, hook) };
        Ok(())
    }

    fn is_screenshots_hooked(&self) -> Result<bool> {
        let ptr = self.screenshots_ptr()?;
        Ok(unsafe { (self.api.is_screenshots_hooked)(ptr) })
    }

    fn trigger_screenshot(&self) -> Result<()> {
        let ptr = self.screenshots_ptr()?;
        unsafe { (self.api.trigger_screenshot)(ptr) };
        Ok(())
    }

    fn add_screenshot_to_library(
        &self,
        filename: &Path,
        thumbnail: Option<&Path>,
        width: i32,
        height: i32,
    ) -> Result<ScreenshotHandle> {
        let ptr = self.screenshots_ptr()?;
        let filename = c_path(filename)?;
        let thumbnail = thumbnail.map(c_path).transpose()?;
        let thumbnail_ptr = thumbnail
            .as_ref()
            .map_or(std::ptr::null(), |t| t.as_ptr());

        let handle = unsafe {
            (self.api.add_screenshot_to_library)(ptr, filename.as_ptr(), thumbnail_ptr, width, height)
        };
        Ok(ScreenshotHandle(handle))
    }
}

impl Drop for DynamicBinding {
    fn drop(&mut self) {
        if self.pipe.get_mut().take().is_some() {
            unsafe { (self.api.shutdown)() };
            tracing::debug!("Steam API shut down");
        }
    }
}
