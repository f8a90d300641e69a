use std::path::{Path, PathBuf};

use ash::vk::Extent2D;
use log::LevelFilter;

use crate::error::{Error, Result};

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
pub const WINDOW_TITLE: &str = "Hello, Triangle";

const VERTEX_SHADER_FILE: &str = "vert.spv";
const FRAGMENT_SHADER_FILE: &str = "frag.spv";

/// Debug builds log resource creation, release builds only the milestones.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Decides which runtime checks are performed.
///
/// `layers` enables the Khronos validation layer and the debug messenger.
/// `preconditions` enables the crate's own argument and lifecycle checks; with
/// them off the checks are skipped and the driver's result is reported as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub layers: bool,
    pub preconditions: bool,
}

impl ValidationPolicy {
    pub const fn enabled() -> Self {
        Self {
            layers: true,
            preconditions: true,
        }
    }

    pub const fn disabled() -> Self {
        Self {
            layers: false,
            preconditions: false,
        }
    }

    /// Layers follow the `enable_validations` feature, precondition checks
    /// follow debug assertions.
    pub const fn from_build() -> Self {
        Self {
            layers: cfg!(feature = "enable_validations"),
            preconditions: cfg!(debug_assertions),
        }
    }

    /// Runs `check` only when precondition checks are enabled.
    pub fn check(&self, check: impl FnOnce() -> Result<()>) -> Result<()> {
        if self.preconditions {
            check()
        } else {
            Ok(())
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::from_build()
    }
}

/// Location of the pre-compiled SPIR-V blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    base_dir: PathBuf,
}

impl ShaderPaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn vertex(&self) -> PathBuf {
        self.base_dir.join(VERTEX_SHADER_FILE)
    }

    pub fn fragment(&self) -> PathBuf {
        self.base_dir.join(FRAGMENT_SHADER_FILE)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    /// Size of the window, and therefore of the swapchain and viewport
    pub extent: Extent2D,
    pub shaders: ShaderPaths,
    pub validation: ValidationPolicy,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn new(shader_dir: impl Into<PathBuf>) -> Self {
        Self {
            title: WINDOW_TITLE.to_owned(),
            extent: Extent2D {
                width: WINDOW_WIDTH,
                height: WINDOW_HEIGHT,
            },
            shaders: ShaderPaths::new(shader_dir),
            validation: ValidationPolicy::default(),
            log_level: default_log_level(),
        }
    }

    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_extent(mut self, width: u32, height: u32) -> Self {
        self.extent = Extent2D { width, height };
        self
    }

    /// Checks the settings that cannot be handed to the window system as is.
    pub fn validate(&self) -> Result<()> {
        self.validation.check(|| {
            if self.extent.width == 0 || self.extent.height == 0 {
                return Err(Error::InvalidExtent {
                    width: self.extent.width,
                    height: self.extent.height,
                });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn shader_paths_use_fixed_file_names() {
        let paths = ShaderPaths::new("/opt/triangle/shaders");
        assert_eq!(paths.vertex(), Path::new("/opt/triangle/shaders/vert.spv"));
        assert_eq!(
            paths.fragment(),
            Path::new("/opt/triangle/shaders/frag.spv")
        );
    }

    #[test]
    fn default_config_matches_fixed_window() {
        let config = AppConfig::new("shaders");
        assert_eq!(config.extent.width, 800);
        assert_eq!(config.extent.height, 600);
        assert_eq!(config.title, WINDOW_TITLE);
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn default_log_level_follows_build() {
        let expected = if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        assert_eq!(default_log_level(), expected);
    }

    #[test]
    fn zero_extent_is_rejected_when_checks_are_on() {
        let config = AppConfig::new("shaders")
            .with_extent(0, 600)
            .with_validation(ValidationPolicy::enabled());
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn disabled_policy_skips_checks() {
        let config = AppConfig::new("shaders")
            .with_extent(0, 0)
            .with_validation(ValidationPolicy::disabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn check_runs_closure_only_when_enabled() {
        let mut ran = false;
        ValidationPolicy::disabled()
            .check(|| {
                ran = true;
                Ok(())
            })
            .unwrap();
        assert!(!ran);

        ValidationPolicy::enabled()
            .check(|| {
                ran = true;
                Ok(())
            })
            .unwrap();
        assert!(ran);
    }
}
