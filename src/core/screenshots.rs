use crate::domain::model::ScreenshotHandle;
use crate::domain::ports::NativeBinding;
use crate::utils::error::{Result, ShimError};
use std::path::Path;

pub struct Screenshots<'a> {
    binding: &'a dyn NativeBinding,
}

impl<'a> Screenshots<'a> {
    pub(crate) fn new(binding: &'a dyn NativeBinding) -> Self {
        Self { binding }
    }

    /// When hooked, the hotkey raises `ScreenshotRequested` instead of the
    /// overlay capturing the frame itself.
    pub fn hook_screenshots(&self, hook: bool) -> Result<()> {
        self.binding.hook_screenshots(hook)
    }

    pub fn is_screenshots_hooked(&self) -> Result<bool> {
        self.binding.is_screenshots_hooked()
    }

    pub fn trigger_screenshot(&self) -> Result<()> {
        self.binding.trigger_screenshot()
    }

    /// Adds an image from disk to the user's screenshot library.
    pub fn add_screenshot_to_library(
        &self,
        filename: &Path,
        thumbnail: Option<&Path>,
        width: i32,
        height: i32,
    ) -> Result<ScreenshotHandle> {
        if width <= 0 || height <= 0 {
            return Err(ShimError::Screenshot {
                message: format!("invalid dimensions {}x{}", width, height),
            });
        }

        let handle = self
            .binding
            .add_screenshot_to_library(filename, thumbnail, width, height)?;
        if !handle.is_valid() {
            return Err(ShimError::Screenshot {
                message: format!("library rejected {}", filename.display()),
            });
        }

        tracing::debug!("Screenshot {} added as handle {}", filename.display(), handle.0);
        Ok(handle)
    }
}
