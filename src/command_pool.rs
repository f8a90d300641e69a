use std::rc::Rc;

use ash::vk::{
    self, CommandBuffer, CommandBufferAllocateInfo, CommandBufferLevel, CommandPoolCreateFlags,
    CommandPoolCreateInfo,
};
use tracing::debug;

use crate::{
    error::{Error, Result},
    LogicalDevice,
};

/// Pool on the graphics queue family whose buffers can be reset one by one.
pub struct CommandPool {
    command_buffers: Vec<CommandBuffer>,
    command_pool: vk::CommandPool,
    logical_device: Rc<LogicalDevice>,
}

impl CommandPool {
    pub fn new(logical_device: &Rc<LogicalDevice>, buffer_count: u32) -> Result<Self> {
        let queue_families = logical_device.get_queue_families();

        let create_command_pool = CommandPoolCreateInfo::builder()
            .flags(CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_families.graphics_family);
        let command_pool = unsafe { logical_device.create_command_pool(&create_command_pool, None) }
            .map_err(Error::CommandPoolCreation)?;

        let allocate_info = CommandBufferAllocateInfo::builder()
            .command_pool(command_pool)
            .level(CommandBufferLevel::PRIMARY)
            .command_buffer_count(buffer_count);
        let command_buffers = match unsafe { logical_device.allocate_command_buffers(&allocate_info) }
        {
            Ok(command_buffers) => command_buffers,
            Err(result) => {
                unsafe { logical_device.destroy_command_pool(command_pool, None) };
                return Err(Error::CommandBufferAllocation(result));
            }
        };
        debug!("Command pool created with {buffer_count} primary buffer(s)");

        Ok(Self {
            command_buffers,
            command_pool,
            logical_device: Rc::clone(logical_device),
        })
    }

    pub fn get_command_buffers(&self) -> &[CommandBuffer] {
        &self.command_buffers
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        debug!("Dropping CommandPool");
        // frees the buffers allocated from it as well
        unsafe {
            self.logical_device
                .destroy_command_pool(self.command_pool, None)
        }
    }
}
