use crate::adapters::native::DynamicBinding;
use crate::config::ShimConfig;
use crate::core::callbacks::CallbackRegistry;
use crate::core::friends::Friends;
use crate::core::overlay::{Overlay, OverlayOptions};
use crate::core::platform;
use crate::core::pump::{interval_for_rate, CallbackPump, DEFAULT_CALLBACK_RATE_HZ};
use crate::core::screenshots::Screenshots;
use crate::domain::model::AppId;
use crate::domain::ports::{HostShell, NativeBinding};
use crate::utils::error::Result;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Entry point: owns the native binding, the callback pump and the overlay state.
pub struct Steamworks {
    binding: Arc<dyn NativeBinding>,
    callbacks: Arc<CallbackRegistry>,
    pump: CallbackPump,
    overlay: Overlay,
}

impl Steamworks {
    pub fn new(binding: Arc<dyn NativeBinding>) -> Self {
        Self {
            binding,
            callbacks: CallbackRegistry::new(),
            pump: CallbackPump::new(interval_for_rate(DEFAULT_CALLBACK_RATE_HZ)),
            overlay: Overlay::new(None),
        }
    }

    /// Opens the prebuilt library for this OS/architecture under `dist_dir`.
    pub fn load(dist_dir: impl AsRef<Path>) -> Result<Self> {
        let artifact = platform::current()?;
        let path = artifact.resolve(dist_dir.as_ref());
        tracing::debug!("Loading {}/{} binding from {}", artifact.os, artifact.arch, path.display());
        let binding = DynamicBinding::open(&path)?;
        Ok(Self::new(Arc::new(binding)))
    }

    pub fn with_shell(mut self, shell: Arc<dyn HostShell>) -> Self {
        self.overlay = Overlay::new(Some(shell));
        self
    }

    pub fn with_pump_interval(mut self, interval: Duration) -> Self {
        self.pump = CallbackPump::new(interval);
        self
    }

    /// Initializes the SDK and (re)starts the callback pump.
    ///
    /// A failed init leaves any running pump untouched.
    pub fn init(&self, app_id: Option<AppId>) -> Result<Client> {
        self.binding.init(app_id)?;
        let generation = self
            .pump
            .restart(Arc::clone(&self.binding), Arc::clone(&self.callbacks))?;

        match app_id {
            Some(id) => tracing::info!("Steam API initialized for app {} (pump #{})", id, generation),
            None => tracing::info!("Steam API initialized from steam_appid.txt (pump #{})", generation),
        }

        Ok(Client {
            binding: Arc::clone(&self.binding),
            callbacks: Arc::clone(&self.callbacks),
        })
    }

    /// True when the process was not launched through Steam and should exit.
    pub fn restart_app_if_necessary(&self, app_id: AppId) -> bool {
        self.binding.restart_app_if_necessary(app_id)
    }

    pub fn enable_overlay(&self, options: OverlayOptions) -> Result<()> {
        self.overlay.enable(options)
    }

    /// Applies the `[overlay]` section of `config`. `Ok(false)` when it is absent or disabled.
    pub fn enable_configured_overlay(&self, config: &ShimConfig) -> Result<bool> {
        match config.overlay_options() {
            Some(options) => {
                self.overlay.enable(options)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn pump(&self) -> &CallbackPump {
        &self.pump
    }

    /// Registry available before `init`.
    pub fn callbacks(&self) -> Arc<CallbackRegistry> {
        Arc::clone(&self.callbacks)
    }
}

/// Initialized API handed out by [`Steamworks::init`].
#[derive(Clone)]
pub struct Client {
    binding: Arc<dyn NativeBinding>,
    callbacks: Arc<CallbackRegistry>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    pub fn friends(&self) -> Friends<'_> {
        Friends::new(self.binding.as_ref())
    }

    pub fn screenshots(&self) -> Screenshots<'_> {
        Screenshots::new(self.binding.as_ref())
    }

    pub fn callbacks(&self) -> &Arc<CallbackRegistry> {
        &self.callbacks
    }
}
