use std::{ops::Deref, rc::Rc};

use ash::vk::{self, PipelineLayoutCreateInfo};
use tracing::debug;

use crate::{
    error::{Error, Result},
    LogicalDevice,
};

/// A layout with no descriptor sets and no push constants.
pub struct PipelineLayout {
    pipeline_layout: vk::PipelineLayout,
    logical_device: Rc<LogicalDevice>,
}

impl PipelineLayout {
    pub fn new(logical_device: &Rc<LogicalDevice>) -> Result<Self> {
        let pipeline_layout_info = PipelineLayoutCreateInfo::builder();
        let pipeline_layout =
            unsafe { logical_device.create_pipeline_layout(&pipeline_layout_info, None) }
                .map_err(Error::PipelineLayoutCreation)?;
        Ok(Self {
            pipeline_layout,
            logical_device: Rc::clone(logical_device),
        })
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        debug!("Dropping PipelineLayout");
        unsafe {
            self.logical_device
                .destroy_pipeline_layout(self.pipeline_layout, None)
        }
    }
}

impl Deref for PipelineLayout {
    type Target = vk::PipelineLayout;

    fn deref(&self) -> &Self::Target {
        &self.pipeline_layout
    }
}
