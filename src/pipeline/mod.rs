mod layout;
mod shader;
pub mod vertex;

use std::{ffi::CStr, ops::Deref, rc::Rc};

use ash::vk::{
    self, ColorComponentFlags, CullModeFlags, Extent2D, Format, FrontFace,
    GraphicsPipelineCreateInfo, PipelineCache, PipelineColorBlendAttachmentState,
    PipelineColorBlendStateCreateInfo, PipelineInputAssemblyStateCreateInfo,
    PipelineMultisampleStateCreateInfo, PipelineRasterizationStateCreateInfo,
    PipelineRenderingCreateInfo, PipelineShaderStageCreateInfo,
    PipelineVertexInputStateCreateInfo, PipelineViewportStateCreateInfo, PolygonMode,
    PrimitiveTopology, Rect2D, SampleCountFlags, ShaderStageFlags, Viewport,
};
use tracing::debug;

pub use self::{
    layout::PipelineLayout,
    shader::{load_shader_code, ShaderModule},
};
use crate::{
    config::{ShaderPaths, ValidationPolicy},
    error::{Error, Result},
    LogicalDevice,
};

const ENTRY_POINT: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"main\0") };

pub struct GraphicsPipeline {
    pipeline: vk::Pipeline,
    // destroyed after the pipeline by field drop order
    _layout: PipelineLayout,
    logical_device: Rc<LogicalDevice>,
}

impl GraphicsPipeline {
    /// Builds the triangle pipeline for dynamic rendering into `color_format`
    /// images. The viewport and scissor are fixed to `extent`.
    pub fn new(
        logical_device: &Rc<LogicalDevice>,
        shaders: &ShaderPaths,
        validation: ValidationPolicy,
        color_format: Format,
        extent: Extent2D,
    ) -> Result<Self> {
        debug!(
            "Creating graphics pipeline with shaders from {}...",
            shaders.base_dir().display()
        );

        // both modules are released when this function returns, whatever the outcome
        let vertex_shader_module =
            ShaderModule::load(logical_device, &shaders.vertex(), validation)?;
        let fragment_shader_module =
            ShaderModule::load(logical_device, &shaders.fragment(), validation)?;
        let shader_stages = [
            PipelineShaderStageCreateInfo::builder()
                .stage(ShaderStageFlags::VERTEX)
                .module(*vertex_shader_module)
                .name(ENTRY_POINT)
                .build(),
            PipelineShaderStageCreateInfo::builder()
                .stage(ShaderStageFlags::FRAGMENT)
                .module(*fragment_shader_module)
                .name(ENTRY_POINT)
                .build(),
        ];

        // vertex shader configuration to tell it how to get input data
        let binding_descriptions = vertex::binding_descriptions();
        let attribute_descriptions = vertex::attribute_descriptions();
        let vertex_input_state = PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        // how to process vertecies
        let input_assembly_state = PipelineInputAssemblyStateCreateInfo::builder()
            .topology(PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // viewport and clipping (scissoring) settings
        let viewports = [Viewport::builder()
            .width(extent.width as f32)
            .height(extent.height as f32)
            .min_depth(0.0)
            .max_depth(1.0)
            .build()];
        let scissors = [Rect2D::builder().extent(extent).build()];
        let viewport_state = PipelineViewportStateCreateInfo::builder()
            .viewports(&viewports)
            .scissors(&scissors);

        // rasterization settings
        let rasterization_state = PipelineRasterizationStateCreateInfo::builder()
            .polygon_mode(PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(CullModeFlags::BACK)
            .front_face(FrontFace::CLOCKWISE);

        // multisampling settings
        let multisample_state = PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(SampleCountFlags::TYPE_1);

        // disabling blending just takes the new output and passes it thru unchanged
        let color_blend_attachment_states = [PipelineColorBlendAttachmentState::builder()
            .color_write_mask(ColorComponentFlags::RGBA)
            .blend_enable(false)
            .build()];
        let color_blend_state = PipelineColorBlendStateCreateInfo::builder()
            .attachments(&color_blend_attachment_states);

        // no render pass, draw straight into the swapchain image format
        let color_attachment_formats = [color_format];
        let mut rendering_info =
            PipelineRenderingCreateInfo::builder().color_attachment_formats(&color_attachment_formats);

        let layout = PipelineLayout::new(logical_device)?;

        let pipeline_create_infos = [GraphicsPipelineCreateInfo::builder()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .layout(*layout)
            .push_next(&mut rendering_info)
            .build()];

        let pipelines = unsafe {
            logical_device.create_graphics_pipelines(
                PipelineCache::null(),
                &pipeline_create_infos,
                None,
            )
        }
        .map_err(|(_, result)| Error::PipelineCreation(result))?;

        debug!("Graphics pipeline created");

        Ok(Self {
            pipeline: pipelines[0],
            _layout: layout,
            logical_device: Rc::clone(logical_device),
        })
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        debug!("Dropping GraphicsPipeline");
        unsafe { self.logical_device.destroy_pipeline(self.pipeline, None) }
    }
}

impl Deref for GraphicsPipeline {
    type Target = vk::Pipeline;

    fn deref(&self) -> &Self::Target {
        &self.pipeline
    }
}
