use std::{fmt, io, path::PathBuf};

use ash::vk;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad categories every [`Error`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input, or an object used in the wrong lifecycle state.
    Precondition,
    /// A required extension, layer, queue family or surface feature is missing.
    CapabilityUnmet,
    /// The driver rejected a creation or query call.
    ResourceCreation,
    /// Shader bytecode could not be read.
    Io,
    /// Command recording, submission or presentation failed after init.
    Draw,
}

/// The step of the frame protocol a draw failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Wait,
    Acquire,
    Record,
    Submit,
    Present,
    Idle,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameStage::Wait => "waiting on the in-flight fence",
            FrameStage::Acquire => "acquiring a swapchain image",
            FrameStage::Record => "recording the command buffer",
            FrameStage::Submit => "submitting the command buffer",
            FrameStage::Present => "presenting the swapchain image",
            FrameStage::Idle => "waiting for the device to go idle",
        };
        f.write_str(name)
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("the application is already initialized")]
    AlreadyInitialized,
    #[error("the application has not been initialized")]
    NotInitialized,
    #[error("window extent must be non-zero, got {width}x{height}")]
    InvalidExtent { width: u32, height: u32 },
    #[error("{path} does not contain SPIR-V bytecode")]
    InvalidShader { path: PathBuf },

    #[error("failed to initialize GLFW: {0}")]
    WindowSystem(#[from] glfw::InitError),
    #[error("GLFW reports that Vulkan is not supported")]
    VulkanUnsupported,
    #[error("failed to create the window")]
    WindowCreation,

    #[error("instance extension #{index} `{name}` is not available")]
    MissingInstanceExtension { index: usize, name: String },
    #[error("validation layer #{index} `{name}` is not available")]
    MissingValidationLayer { index: usize, name: String },
    #[error("device extension #{index} `{name}` is not available")]
    MissingDeviceExtension { index: usize, name: String },
    #[error("no physical devices")]
    NoPhysicalDevices,
    #[error("device supports Vulkan {found}, {required} is required")]
    UnsupportedApiVersion { required: String, found: String },
    #[error("no queue family supports graphics")]
    NoGraphicsQueueFamily,
    #[error("no queue family can present to the surface")]
    NoPresentQueueFamily,
    #[error("the surface reports no formats")]
    NoSurfaceFormats,
    #[error("the surface reports no present modes")]
    NoPresentModes,

    #[error("failed to query {what}: {result}")]
    Query { what: &'static str, result: vk::Result },
    #[error("failed to create the instance: {0}")]
    InstanceCreation(vk::Result),
    #[error("failed to create the debug messenger: {0}")]
    DebugMessengerCreation(vk::Result),
    #[error("failed to create the surface: {0}")]
    SurfaceCreation(vk::Result),
    #[error("failed to create the logical device: {0}")]
    DeviceCreation(vk::Result),
    #[error("failed to create the swapchain: {0}")]
    SwapchainCreation(vk::Result),
    #[error("failed to create image view #{index}: {result}")]
    ImageViewCreation { index: usize, result: vk::Result },
    #[error("failed to create a shader module: {0}")]
    ShaderModuleCreation(vk::Result),
    #[error("failed to create the pipeline layout: {0}")]
    PipelineLayoutCreation(vk::Result),
    #[error("failed to create the graphics pipeline: {0}")]
    PipelineCreation(vk::Result),
    #[error("failed to create the command pool: {0}")]
    CommandPoolCreation(vk::Result),
    #[error("failed to allocate the command buffer: {0}")]
    CommandBufferAllocation(vk::Result),
    #[error("failed to create a synchronization object: {0}")]
    SyncObjectCreation(vk::Result),

    #[error("shader file not found: {path}")]
    ShaderNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read shader {path}")]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("draw failed while {stage}: {result}")]
    Draw { stage: FrameStage, result: vk::Result },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyInitialized
            | Error::NotInitialized
            | Error::InvalidExtent { .. }
            | Error::InvalidShader { .. } => ErrorKind::Precondition,

            Error::VulkanUnsupported
            | Error::MissingInstanceExtension { .. }
            | Error::MissingValidationLayer { .. }
            | Error::MissingDeviceExtension { .. }
            | Error::NoPhysicalDevices
            | Error::UnsupportedApiVersion { .. }
            | Error::NoGraphicsQueueFamily
            | Error::NoPresentQueueFamily
            | Error::NoSurfaceFormats
            | Error::NoPresentModes => ErrorKind::CapabilityUnmet,

            Error::WindowSystem(_)
            | Error::WindowCreation
            | Error::Query { .. }
            | Error::InstanceCreation(_)
            | Error::DebugMessengerCreation(_)
            | Error::SurfaceCreation(_)
            | Error::DeviceCreation(_)
            | Error::SwapchainCreation(_)
            | Error::ImageViewCreation { .. }
            | Error::ShaderModuleCreation(_)
            | Error::PipelineLayoutCreation(_)
            | Error::PipelineCreation(_)
            | Error::CommandPoolCreation(_)
            | Error::CommandBufferAllocation(_)
            | Error::SyncObjectCreation(_) => ErrorKind::ResourceCreation,

            Error::ShaderNotFound { .. } | Error::ShaderRead { .. } => ErrorKind::Io,

            Error::Draw { .. } => ErrorKind::Draw,
        }
    }

    pub(crate) fn draw(stage: FrameStage) -> impl FnOnce(vk::Result) -> Self {
        move |result| Error::Draw { stage, result }
    }

    pub(crate) fn query(what: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Error::Query { what, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_maps_to_one_kind() {
        assert_eq!(Error::AlreadyInitialized.kind(), ErrorKind::Precondition);
        assert_eq!(Error::NoPhysicalDevices.kind(), ErrorKind::CapabilityUnmet);
        assert_eq!(
            Error::MissingDeviceExtension {
                index: 0,
                name: "VK_KHR_swapchain".to_owned()
            }
            .kind(),
            ErrorKind::CapabilityUnmet
        );
        assert_eq!(
            Error::PipelineLayoutCreation(vk::Result::ERROR_OUT_OF_HOST_MEMORY).kind(),
            ErrorKind::ResourceCreation
        );
        assert_eq!(
            Error::ShaderNotFound {
                path: PathBuf::from("vert.spv"),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .kind(),
            ErrorKind::Io
        );
        assert_eq!(
            Error::draw(FrameStage::Submit)(vk::Result::ERROR_DEVICE_LOST).kind(),
            ErrorKind::Draw
        );
    }

    #[test]
    fn draw_failure_names_the_stage() {
        let err = Error::draw(FrameStage::Acquire)(vk::Result::ERROR_OUT_OF_DATE_KHR);
        let message = err.to_string();
        assert!(message.contains("acquiring a swapchain image"), "{message}");
    }

    #[test]
    fn missing_capability_reports_index_and_name() {
        let err = Error::MissingValidationLayer {
            index: 2,
            name: "VK_LAYER_KHRONOS_validation".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "validation layer #2 `VK_LAYER_KHRONOS_validation` is not available"
        );
    }
}
