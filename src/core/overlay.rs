//! Steam overlay support for desktop shells.
//!
//! Some rendering backends never notice the overlay drawing on top of a
//! window, so every window gets a timer that marks it dirty at a fixed rate.

use crate::domain::ports::{HostShell, ShellWindow};
use crate::utils::error::{Result, ShimError};
use crate::utils::validation::{validate_range, Validate};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_FPS_LIMIT: u32 = 30;
pub const LEGACY_FPS: u32 = 60;
pub const MAX_FPS_LIMIT: u32 = 240;

const MINIMAL_SWITCHES: &[(&str, Option<&str>)] = &[
    ("in-process-gpu", None),
    ("disable-direct-composition", None),
];

const EXTENDED_SWITCHES: &[(&str, Option<&str>)] = &[
    ("in-process-gpu", None),
    ("disable-direct-composition", None),
    ("disable-gpu-shader-disk-cache", None),
    ("disable-http-cache", None),
    ("use-angle", Some("d3d11")),
    ("disable-renderer-backgrounding", None),
    ("disable-background-timer-throttling", None),
];

/// Command line switches appended to the shell before the overlay hooks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchProfile {
    Minimal,
    Extended,
}

impl SwitchProfile {
    pub fn switches(self) -> &'static [(&'static str, Option<&'static str>)] {
        match self {
            SwitchProfile::Minimal => MINIMAL_SWITCHES,
            SwitchProfile::Extended => EXTENDED_SWITCHES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayOptions {
    pub switches: SwitchProfile,
    pub frame_invalidation: bool,
    pub fps_limit: u32,
    pub require_ready: bool,
    pub skip_hidden: bool,
}

impl OverlayOptions {
    /// Two switches and a 60 fps invalidator on every window.
    pub fn legacy(disable_each_frame_invalidation: bool) -> Self {
        Self {
            switches: SwitchProfile::Minimal,
            frame_invalidation: !disable_each_frame_invalidation,
            fps_limit: LEGACY_FPS,
            require_ready: false,
            skip_hidden: false,
        }
    }

    /// Full switch set, ready check, and a capped invalidator that skips hidden windows.
    pub fn with_fps_limit(fps_limit: u32) -> Self {
        Self {
            switches: SwitchProfile::Extended,
            frame_invalidation: true,
            fps_limit,
            require_ready: true,
            skip_hidden: true,
        }
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps_limit.max(1)))
    }
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self::with_fps_limit(DEFAULT_FPS_LIMIT)
    }
}

impl Validate for OverlayOptions {
    fn validate(&self) -> Result<()> {
        validate_range("overlay.fps_limit", self.fps_limit, 1, MAX_FPS_LIMIT)
    }
}

struct Invalidator {
    token: u64,
    handle: JoinHandle<()>,
}

type Invalidators = Arc<Mutex<HashMap<u64, Invalidator>>>;

/// Removes the entry for `window_id` if it still belongs to the attachment identified by `token`.
fn detach(invalidators: &Invalidators, window_id: u64, token: u64) -> Option<JoinHandle<()>> {
    let mut invalidators = invalidators.lock();
    let owned = invalidators
        .get(&window_id)
        .is_some_and(|entry| entry.token == token);
    if owned {
        invalidators.remove(&window_id).map(|entry| entry.handle)
    } else {
        None
    }
}

/// Overlay integration for one host shell. Enabling is a one-shot operation.
pub struct Overlay {
    shell: Option<Arc<dyn HostShell>>,
    enabled: Mutex<bool>,
    invalidators: Invalidators,
}

impl Overlay {
    pub fn new(shell: Option<Arc<dyn HostShell>>) -> Self {
        Self {
            shell,
            enabled: Mutex::new(false),
            invalidators: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.lock()
    }

    /// Windows that currently have a running invalidator.
    pub fn attached_windows(&self) -> usize {
        self.invalidators.lock().len()
    }

    pub fn enable(&self, options: OverlayOptions) -> Result<()> {
        // Held for the whole call so concurrent callers append switches once.
        let mut enabled = self.enabled.lock();
        if *enabled {
            tracing::info!("Steam overlay already initialized");
            return Ok(());
        }

        let shell = self.shell.as_ref().ok_or(ShimError::ShellNotFound)?;
        options.validate()?;

        if options.require_ready && !shell.is_ready() {
            return Err(ShimError::ShellNotReady);
        }

        let runtime = if options.frame_invalidation {
            Some(Handle::try_current().map_err(|_| ShimError::NoRuntime {
                task: "overlay invalidator",
            })?)
        } else {
            None
        };

        for (switch, value) in options.switches.switches() {
            if let Err(e) = shell.append_switch(switch, *value) {
                tracing::error!("Error appending command line switch {}: {}", switch, e);
                return Err(ShimError::Switch {
                    switch: switch.to_string(),
                    message: e.to_string(),
                });
            }
        }
        tracing::debug!(
            "Appended {} command line switches ({:?})",
            options.switches.switches().len(),
            options.switches
        );

        if let Some(runtime) = runtime {
            let attacher = Attacher {
                invalidators: Arc::clone(&self.invalidators),
                tokens: Arc::new(AtomicU64::new(0)),
                runtime,
                period: options.frame_period(),
                skip_hidden: options.skip_hidden,
            };

            for window in shell.windows() {
                if let Err(e) = attacher.attach(window) {
                    tracing::error!("Error setting up overlay invalidator: {}", e);
                }
            }

            let on_created = attacher.clone();
            let hook = Box::new(move |window: Arc<dyn ShellWindow>| {
                if let Err(e) = on_created.attach(window) {
                    tracing::error!("Error setting up overlay invalidator: {}", e);
                }
            });
            if let Err(e) = shell.on_window_created(hook) {
                tracing::error!("Error attaching overlay invalidator: {}", e);
                self.abort_invalidators();
                return Err(ShimError::Attach {
                    message: e.to_string(),
                });
            }
        }

        *enabled = true;
        tracing::info!(
            "Steam overlay enabled (frame invalidation: {}, fps: {})",
            options.frame_invalidation,
            options.fps_limit
        );
        Ok(())
    }

    fn abort_invalidators(&self) {
        for (_, entry) in self.invalidators.lock().drain() {
            entry.handle.abort();
        }
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        self.abort_invalidators();
    }
}

#[derive(Clone)]
struct Attacher {
    invalidators: Invalidators,
    tokens: Arc<AtomicU64>,
    runtime: Handle,
    period: Duration,
    skip_hidden: bool,
}

impl Attacher {
    fn attach(&self, window: Arc<dyn ShellWindow>) -> Result<()> {
        let window_id = window.id();
        if window.contents().is_none() {
            return Err(ShimError::Window {
                window_id,
                message: "invalid window or web contents".to_string(),
            });
        }

        let token = self.tokens.fetch_add(1, Ordering::Relaxed);
        {
            // Insert before the loop can observe a destroyed window and detach itself.
            let mut invalidators = self.invalidators.lock();
            let handle = self.runtime.spawn(invalidate_loop(
                Arc::clone(&window),
                self.period,
                self.skip_hidden,
                Arc::clone(&self.invalidators),
                token,
            ));
            if let Some(previous) = invalidators.insert(window_id, Invalidator { token, handle }) {
                previous.handle.abort();
            }
        }

        let invalidators = Arc::clone(&self.invalidators);
        let on_closed = Box::new(move || {
            if let Some(handle) = detach(&invalidators, window_id, token) {
                handle.abort();
                tracing::debug!("Overlay invalidator detached from window {}", window_id);
            }
        });
        if let Err(e) = window.on_closed(on_closed) {
            // The loop still ends on its own once the window is destroyed.
            return Err(ShimError::Window {
                window_id,
                message: e.to_string(),
            });
        }

        tracing::debug!(
            "Overlay invalidator attached to window {} ({:?} period)",
            window_id,
            self.period
        );
        Ok(())
    }
}

async fn invalidate_loop(
    window: Arc<dyn ShellWindow>,
    period: Duration,
    skip_hidden: bool,
    invalidators: Invalidators,
    token: u64,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;

        if window.is_destroyed() {
            detach(&invalidators, window.id(), token);
            tracing::debug!("Window {} destroyed, stopping invalidator", window.id());
            break;
        }
        if skip_hidden && !window.is_visible() {
            continue;
        }
        let Some(contents) = window.contents() else {
            continue;
        };
        if contents.is_painting() {
            continue;
        }
        if let Err(e) = contents.invalidate() {
            tracing::error!("Error in overlay invalidator interval: {}", e);
        }
    }
}
