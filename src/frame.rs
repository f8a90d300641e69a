use std::rc::Rc;

use ash::vk::{
    AccessFlags, AttachmentLoadOp, AttachmentStoreOp, ClearColorValue, ClearValue, CommandBuffer,
    CommandBufferBeginInfo, CommandBufferResetFlags, DependencyFlags, Image, ImageLayout,
    ImageMemoryBarrier, PipelineBindPoint, PipelineStageFlags, PresentInfoKHR, Rect2D,
    RenderingAttachmentInfo, RenderingInfo, SubmitInfo, QUEUE_FAMILY_IGNORED,
};
use tracing::{debug, trace, warn};

use crate::{
    error::{Error, FrameStage, Result},
    image_view::COLOR_SUBRESOURCE_RANGE,
    sync::{FenceGuard, SemaphoreGuard},
    GraphicsPipeline, LogicalDevice, PresentationChain,
};

/// Only one frame is ever being recorded or executed at a time.
pub const MAX_FRAMES_IN_FLIGHT: usize = 1;

const CLEAR_COLOR: ClearColorValue = ClearColorValue {
    float32: [0.0, 0.0, 0.0, 1.0],
};

/// An image layout change together with the accesses and stages it orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTransition {
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
    pub src_stage: PipelineStageFlags,
    pub dst_stage: PipelineStageFlags,
}

impl LayoutTransition {
    /// Whatever the image held before is discarded; it is about to be cleared.
    pub const TO_COLOR_ATTACHMENT: Self = Self {
        old_layout: ImageLayout::UNDEFINED,
        new_layout: ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        src_access: AccessFlags::empty(),
        dst_access: AccessFlags::COLOR_ATTACHMENT_WRITE,
        src_stage: PipelineStageFlags::TOP_OF_PIPE,
        dst_stage: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
    };

    pub const TO_PRESENT: Self = Self {
        old_layout: ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        new_layout: ImageLayout::PRESENT_SRC_KHR,
        src_access: AccessFlags::COLOR_ATTACHMENT_WRITE,
        dst_access: AccessFlags::empty(),
        src_stage: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
        dst_stage: PipelineStageFlags::BOTTOM_OF_PIPE,
    };

    pub fn barrier(&self, image: Image) -> ImageMemoryBarrier {
        ImageMemoryBarrier::builder()
            .src_access_mask(self.src_access)
            .dst_access_mask(self.dst_access)
            .old_layout(self.old_layout)
            .new_layout(self.new_layout)
            .src_queue_family_index(QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(COLOR_SUBRESOURCE_RANGE)
            .build()
    }
}

/// Struct representing an abstract "Frame" that can be
/// rendered. Contains the resources needed for a particular
/// frame rendering loop.
pub struct Frame {
    command_buffer: CommandBuffer,
    /// Semaphore for when the image is available to be used from the
    /// swapchain
    image_available_semaphore: SemaphoreGuard,
    /// Semaphore for when the rendering has finished
    render_finished_semaphore: SemaphoreGuard,
    /// Fence for waiting until the GPU is done with this frame. Created
    /// signaled so the very first wait returns immediately.
    in_flight_fence: FenceGuard,
    logical_device: Rc<LogicalDevice>,
}

impl Frame {
    pub fn new(logical_device: &Rc<LogicalDevice>, command_buffer: CommandBuffer) -> Result<Self> {
        Ok(Self {
            command_buffer,
            image_available_semaphore: SemaphoreGuard::new(logical_device)?,
            render_finished_semaphore: SemaphoreGuard::new(logical_device)?,
            in_flight_fence: FenceGuard::new(logical_device, true)?,
            logical_device: Rc::clone(logical_device),
        })
    }

    /// Draws one triangle into the next swapchain image and queues it for
    /// presentation.
    pub fn render(&self, chain: &PresentationChain, pipeline: &GraphicsPipeline) -> Result<()> {
        let fences = [*self.in_flight_fence];
        unsafe {
            // wait for previous draw to complete
            self.logical_device
                .wait_for_fences(&fences, true, u64::MAX)
                .map_err(Error::draw(FrameStage::Wait))?;
            // reset the fence so that it can be re-signaled when this draw is complete
            self.logical_device
                .reset_fences(&fences)
                .map_err(Error::draw(FrameStage::Wait))?;
        }

        let swapchain = chain.swapchain();
        let image_index =
            swapchain.acquire_next_image_index(*self.image_available_semaphore)?;
        trace!("Acquired swapchain image #{image_index}");

        self.record_command_buffer(image_index as usize, chain, pipeline)
            .map_err(Error::draw(FrameStage::Record))?;

        let queues = self.logical_device.get_queues();
        let wait_semaphores = [*self.image_available_semaphore];
        let signal_semaphores = [*self.render_finished_semaphore];
        let pipeline_stage_flags = [PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [self.command_buffer];
        let submit_info = [SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&pipeline_stage_flags)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build()];
        unsafe {
            self.logical_device
                .queue_submit(queues.graphics, &submit_info, *self.in_flight_fence)
        }
        .map_err(Error::draw(FrameStage::Submit))?;

        let swapchains = [swapchain.get_handle()];
        let image_indices = [image_index];
        let present_info = PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);
        let suboptimal = unsafe { swapchain.queue_present(queues.present, &present_info) }
            .map_err(Error::draw(FrameStage::Present))?;
        if suboptimal {
            warn!("Swapchain is suboptimal for the surface");
        }

        Ok(())
    }

    /// Records the command buffer for execution
    fn record_command_buffer(
        &self,
        image_index: usize,
        chain: &PresentationChain,
        pipeline: &GraphicsPipeline,
    ) -> ash::prelude::VkResult<()> {
        let device = &self.logical_device;
        let image = chain.image(image_index);
        let render_area = Rect2D::builder()
            .extent(chain.swapchain().get_extent())
            .build();

        let color_attachments = [RenderingAttachmentInfo::builder()
            .image_view(**chain.image_view(image_index))
            .image_layout(ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .load_op(AttachmentLoadOp::CLEAR)
            .store_op(AttachmentStoreOp::STORE)
            .clear_value(ClearValue { color: CLEAR_COLOR })
            .build()];
        let rendering_info = RenderingInfo::builder()
            .render_area(render_area)
            .layer_count(1)
            .color_attachments(&color_attachments);

        unsafe {
            device.reset_command_buffer(self.command_buffer, CommandBufferResetFlags::empty())?;
            device.begin_command_buffer(self.command_buffer, &CommandBufferBeginInfo::builder())?;

            self.transition(image, LayoutTransition::TO_COLOR_ATTACHMENT);
            device.cmd_begin_rendering(self.command_buffer, &rendering_info);
            device.cmd_bind_pipeline(self.command_buffer, PipelineBindPoint::GRAPHICS, **pipeline);
            device.cmd_draw(self.command_buffer, 3, 1, 0, 0);
            device.cmd_end_rendering(self.command_buffer);
            self.transition(image, LayoutTransition::TO_PRESENT);

            device.end_command_buffer(self.command_buffer)
        }
    }

    unsafe fn transition(&self, image: Image, transition: LayoutTransition) {
        self.logical_device.cmd_pipeline_barrier(
            self.command_buffer,
            transition.src_stage,
            transition.dst_stage,
            DependencyFlags::empty(),
            &[],
            &[],
            &[transition.barrier(image)],
        );
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        debug!("Dropping Frame");
    }
}
