use std::rc::Rc;

use ash::Entry;
use tracing::{debug, error, info};

use crate::{
    command_pool::CommandPool,
    config::AppConfig,
    debug_messenger::DebugMessenger,
    error::Result,
    frame::{Frame, MAX_FRAMES_IN_FLIGHT},
    physical_device::{pick_physical_device, QueueFamilyIndices},
    run_loop::run_until_closed,
    GraphicsPipeline, Instance, LogicalDevice, PresentationChain, Surface, Window,
};

/// Every resource the renderer owns, from the window down to the per-frame
/// sync objects.
///
/// Fields are declared in the reverse of their creation order so they are
/// dropped child-first.
pub struct Context {
    current_frame: usize,
    frames: Vec<Frame>,
    _command_pool: CommandPool,
    pipeline: GraphicsPipeline,
    chain: PresentationChain,
    logical_device: Rc<LogicalDevice>,
    _surface: Rc<Surface>,
    _debug_messenger: Option<DebugMessenger>,
    _instance: Rc<Instance>,
    window: Window,
}

impl Context {
    /// Brings up the window and every Vulkan object needed to draw. Stops at
    /// the first failure; whatever was already created is released on return.
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let window = Window::new(&config.title, config.extent)?;
        let instance = Rc::new(Instance::new(
            Entry::linked(),
            window.required_instance_extensions(),
            config.validation,
        )?);
        let debug_messenger = DebugMessenger::new(&instance)?;
        let surface = Rc::new(Surface::new(&instance, &window)?);

        let physical_device = pick_physical_device(&instance)?;
        let queue_families = QueueFamilyIndices::find(&instance, physical_device, &surface)?;
        let logical_device = Rc::new(LogicalDevice::new(
            &instance,
            physical_device,
            queue_families,
        )?);

        let chain = PresentationChain::new(&instance, &surface, &logical_device, config.extent)?;
        let swapchain = chain.swapchain();
        let pipeline = GraphicsPipeline::new(
            &logical_device,
            &config.shaders,
            config.validation,
            swapchain.get_surface_format().format,
            swapchain.get_extent(),
        )?;

        let command_pool = CommandPool::new(&logical_device, MAX_FRAMES_IN_FLIGHT as u32)?;
        let frames = command_pool
            .get_command_buffers()
            .iter()
            .map(|command_buffer| Frame::new(&logical_device, *command_buffer))
            .collect::<Result<Vec<_>>>()?;
        info!("Renderer initialized");

        Ok(Self {
            current_frame: 0,
            frames,
            _command_pool: command_pool,
            pipeline,
            chain,
            logical_device,
            _surface: surface,
            _debug_messenger: debug_messenger,
            _instance: instance,
            window,
        })
    }

    /// Draws frames until the window is closed. Returns the number of frames drawn.
    pub fn run(&mut self) -> Result<u64> {
        let Self {
            current_frame,
            frames,
            pipeline,
            chain,
            logical_device,
            window,
            ..
        } = self;

        run_until_closed(
            window,
            || {
                frames[*current_frame].render(chain, pipeline)?;
                *current_frame = (*current_frame + 1) % MAX_FRAMES_IN_FLIGHT;
                Ok(())
            },
            || logical_device.wait_idle(),
        )
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        debug!("Dropping Context");
        // nothing may still be executing when the guards start destroying objects
        if let Err(err) = self.logical_device.wait_idle() {
            error!("Device did not go idle before teardown: {err}");
        }
    }
}
