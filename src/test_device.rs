//! A window, instance, surface and logical device for tests that need a real
//! GPU. Those tests are `#[ignore]`d; run them with
//! `cargo test -- --ignored --test-threads=1` since GLFW wants one thread.

use std::rc::Rc;

use ash::{vk::Extent2D, Entry};

use crate::{
    config::{ValidationPolicy, WINDOW_HEIGHT, WINDOW_WIDTH},
    physical_device::{pick_physical_device, QueueFamilyIndices},
    Instance, LogicalDevice, Surface, Window,
};

pub const EXTENT: Extent2D = Extent2D {
    width: WINDOW_WIDTH,
    height: WINDOW_HEIGHT,
};

/// Fields are dropped top to bottom, children before parents.
pub struct TestDevice {
    pub logical_device: Rc<LogicalDevice>,
    pub surface: Rc<Surface>,
    pub instance: Rc<Instance>,
    pub _window: Window,
}

impl TestDevice {
    pub fn new() -> Self {
        let window = Window::new("test", EXTENT).unwrap();
        let instance = Rc::new(
            Instance::new(
                Entry::linked(),
                window.required_instance_extensions(),
                ValidationPolicy::disabled(),
            )
            .unwrap(),
        );
        let surface = Rc::new(Surface::new(&instance, &window).unwrap());
        let physical_device = pick_physical_device(&instance).unwrap();
        let queue_families = QueueFamilyIndices::find(&instance, physical_device, &surface).unwrap();
        let logical_device =
            Rc::new(LogicalDevice::new(&instance, physical_device, queue_families).unwrap());

        Self {
            logical_device,
            surface,
            instance,
            _window: window,
        }
    }
}
