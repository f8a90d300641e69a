//! Needs a display, a Vulkan 1.3 capable GPU and the compiled shaders, so these
//! only run with `--ignored`.

use std::path::PathBuf;

use rusty_triangle::{AppConfig, Application, Error, ValidationPolicy};

fn shader_dir() -> PathBuf {
    // integration tests live in <profile>/deps
    let exe = std::env::current_exe().unwrap();
    exe.parent().unwrap().parent().unwrap().join("shaders")
}

fn config() -> AppConfig {
    AppConfig::new(shader_dir()).with_validation(ValidationPolicy::enabled())
}

#[test]
#[ignore = "requires a display and a GPU"]
fn init_free_init_round_trip() {
    let mut app = Application::new(config());
    app.init().unwrap();
    assert!(app.is_initialized());
    app.free();
    assert!(!app.is_initialized());

    app.init().unwrap();
    assert!(app.is_initialized());
    app.free();
}

#[test]
#[ignore = "requires a display and a GPU"]
fn second_init_is_rejected_when_checking() {
    let mut app = Application::new(config());
    app.init().unwrap();
    assert!(matches!(app.init(), Err(Error::AlreadyInitialized)));
    assert!(app.is_initialized());
    app.free();
}

#[test]
#[ignore = "requires a display and a GPU"]
fn missing_shaders_leave_the_application_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = Application::new(AppConfig::new(dir.path()));
    let err = app.init().unwrap_err();
    assert!(matches!(err, Error::ShaderNotFound { .. }), "{err}");
    assert!(!app.is_initialized());
}
