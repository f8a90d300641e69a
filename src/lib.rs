mod application;
mod capabilities;
mod command_pool;
pub mod config;
mod context;
mod debug_messenger;
pub mod error;
mod frame;
mod image_view;
mod instance;
pub mod logging;
mod logical_device;
mod physical_device;
mod pipeline;
pub mod run_loop;
mod surface;
mod swapchain;
mod sync;
#[cfg(test)]
mod test_device;
mod window;

pub use self::{
    application::Application,
    capabilities::{first_unmet, Unmet},
    config::{AppConfig, ShaderPaths, ValidationPolicy},
    error::{Error, ErrorKind, FrameStage, Result},
    frame::MAX_FRAMES_IN_FLIGHT,
    image_view::ImageView,
    instance::Instance,
    logical_device::LogicalDevice,
    pipeline::{load_shader_code, GraphicsPipeline},
    surface::Surface,
    swapchain::{PresentationChain, Swapchain, SwapchainSupport},
    window::Window,
};
