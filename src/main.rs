use std::{env, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use rusty_triangle::{logging, AppConfig, Application};
use tracing::error;

fn main() -> ExitCode {
    // nothing is logged until the logger is installed, so these go to stderr
    let config = match shader_dir() {
        Ok(shader_dir) => AppConfig::new(shader_dir),
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logging::init(config.log_level) {
        eprintln!("error: failed to set up logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: AppConfig) -> Result<()> {
    let mut app = Application::new(config);
    app.init().context("failed to initialize the renderer")?;
    let result = app.run();
    app.free();
    result.context("rendering stopped")?;

    Ok(())
}

/// Shaders are compiled next to the executable by the build script.
fn shader_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("cannot locate the running executable")?;
    let dir = exe
        .parent()
        .context("the executable path has no parent directory")?;
    Ok(dir.join("shaders"))
}
