use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    context::Context,
    error::{Error, Result},
};

/// The renderer's lifecycle: `init` → `run` → `free`, repeatable.
pub struct Application {
    config: AppConfig,
    context: Option<Context>,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            context: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    /// Creates the window and all rendering resources. On failure the
    /// application stays uninitialized and nothing is left allocated.
    pub fn init(&mut self) -> Result<()> {
        if self.context.is_some() {
            self.config
                .validation
                .check(|| Err(Error::AlreadyInitialized))?;
            warn!("Application initialized twice, releasing the previous context");
            self.free();
        }

        debug!("Initializing application");
        self.context = Some(Context::new(&self.config)?);
        Ok(())
    }

    /// Runs the frame loop until the window is closed.
    pub fn run(&mut self) -> Result<u64> {
        self.context.as_mut().ok_or(Error::NotInitialized)?.run()
    }

    /// Releases every resource created by `init`. Does nothing when not
    /// initialized.
    pub fn free(&mut self) {
        if self.context.take().is_some() {
            info!("Application resources released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ValidationPolicy, error::ErrorKind};

    #[test]
    fn starts_uninitialized() {
        let app = Application::new(AppConfig::new("shaders"));
        assert!(!app.is_initialized());
        assert_eq!(app.config().extent.width, 800);
    }

    #[test]
    fn run_before_init_fails() {
        let mut app = Application::new(AppConfig::new("shaders"));
        let err = app.run().unwrap_err();
        assert!(matches!(err, Error::NotInitialized));
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn free_without_init_is_a_no_op() {
        let mut app = Application::new(AppConfig::new("shaders"));
        app.free();
        app.free();
        assert!(!app.is_initialized());
    }

    #[test]
    fn zero_extent_fails_before_touching_the_window_system() {
        let config = AppConfig::new("shaders")
            .with_extent(800, 0)
            .with_validation(ValidationPolicy::enabled());
        let mut app = Application::new(config);
        let err = app.init().unwrap_err();
        assert!(matches!(err, Error::InvalidExtent { .. }));
        assert!(!app.is_initialized());
    }
}
