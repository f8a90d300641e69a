use std::ptr;

use ash::vk::{self, Handle};
use glfw::{
    fail_on_errors, Action, ClientApiHint, Glfw, GlfwReceiver, Key, PWindow, WindowEvent,
    WindowHint, WindowMode,
};
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    run_loop::EventPump,
};

/// The GLFW window the triangle is presented in. Fixed size, no client API.
pub struct Window {
    receiver: GlfwReceiver<(f64, WindowEvent)>,
    window: PWindow,
    glfw: Glfw,
}

impl Window {
    pub fn new(title: &str, extent: vk::Extent2D) -> Result<Self> {
        let mut glfw = glfw::init(fail_on_errors!())?;
        if !glfw.vulkan_supported() {
            return Err(Error::VulkanUnsupported);
        }

        glfw.window_hint(WindowHint::ClientApi(ClientApiHint::NoApi));
        glfw.window_hint(WindowHint::Resizable(false));
        let (mut window, receiver) = glfw
            .create_window(extent.width, extent.height, title, WindowMode::Windowed)
            .ok_or(Error::WindowCreation)?;
        window.set_key_polling(true);

        debug!("Window created ({}x{})", extent.width, extent.height);
        Ok(Self {
            receiver,
            window,
            glfw,
        })
    }

    /// Instance extensions GLFW needs to create a surface on this platform.
    pub fn required_instance_extensions(&self) -> Vec<String> {
        self.glfw
            .get_required_instance_extensions()
            .unwrap_or_default()
    }

    pub fn create_surface(&self, instance: &ash::Instance) -> Result<vk::SurfaceKHR> {
        let mut surface = vk::SurfaceKHR::null();
        self.window
            .create_window_surface(instance.handle(), ptr::null(), &mut surface)
            .result()
            .map_err(Error::SurfaceCreation)?;
        if surface.as_raw() == 0 {
            return Err(Error::SurfaceCreation(vk::Result::ERROR_INITIALIZATION_FAILED));
        }
        Ok(surface)
    }
}

impl EventPump for Window {
    fn poll_events(&mut self) {
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.receiver) {
            trace!("{:?}", event);
            if let WindowEvent::Key(Key::Escape, _, Action::Press, _) = event {
                self.window.set_should_close(true);
            }
        }
    }

    fn close_requested(&self) -> bool {
        self.window.should_close()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        debug!("Dropping Window");
    }
}
