use std::{ffi::CString, ops::Deref, rc::Rc};

use ash::{
    extensions::khr,
    vk::{
        DeviceCreateInfo, DeviceQueueCreateInfo, PhysicalDevice,
        PhysicalDeviceDynamicRenderingFeatures, Queue,
    },
    Device,
};
use tracing::debug;

use crate::{
    capabilities,
    error::{Error, FrameStage, Result},
    physical_device::QueueFamilyIndices,
    Instance,
};

/// Handles to the queues created as part of the logical device. Both may be
/// the same queue.
#[derive(Debug, Clone, Copy)]
pub struct Queues {
    pub graphics: Queue,
    pub present: Queue,
}

/// RAII for logical device
pub struct LogicalDevice {
    device: Device,
    physical_device: PhysicalDevice,
    queue_families: QueueFamilyIndices,
    queues: Queues,
    // need to keep a reference to the instance to ensure we get
    // dropped before it does
    _instance: Rc<Instance>,
}

impl LogicalDevice {
    /// Creates the logical device with one queue per distinct family and the
    /// swapchain extension + dynamic rendering feature enabled.
    pub fn new(
        instance: &Rc<Instance>,
        physical_device: PhysicalDevice,
        queue_families: QueueFamilyIndices,
    ) -> Result<Self> {
        let extension_names = required_device_extensions();
        debug!("Device extensions: {:?}", extension_names);
        capabilities::verify_device_extensions(instance, physical_device, &extension_names)?;

        let queue_priorities = [1.0f32];
        let device_queue_create_infos = queue_create_infos(&queue_families, &queue_priorities);

        let extension_names = extension_names
            .iter()
            .filter_map(|name| CString::new(name.as_str()).ok())
            .collect::<Vec<_>>();
        let extension_name_ptrs = extension_names
            .iter()
            .map(|name| name.as_ptr())
            .collect::<Vec<_>>();

        let mut dynamic_rendering =
            PhysicalDeviceDynamicRenderingFeatures::builder().dynamic_rendering(true);
        let device_create_info = DeviceCreateInfo::builder()
            .queue_create_infos(&device_queue_create_infos)
            .enabled_extension_names(&extension_name_ptrs)
            .push_next(&mut dynamic_rendering);

        let device = unsafe { instance.create_device(physical_device, &device_create_info, None) }
            .map_err(Error::DeviceCreation)?;

        let queues = unsafe {
            Queues {
                graphics: device.get_device_queue(queue_families.graphics_family, 0),
                present: device.get_device_queue(queue_families.present_family, 0),
            }
        };
        debug!("Logical device created");

        Ok(Self {
            device,
            physical_device,
            queue_families,
            queues,
            _instance: Rc::clone(instance),
        })
    }

    pub fn get_physical_device(&self) -> PhysicalDevice {
        self.physical_device
    }

    pub fn get_queue_families(&self) -> &QueueFamilyIndices {
        &self.queue_families
    }

    pub fn get_queues(&self) -> &Queues {
        &self.queues
    }

    /// Blocks until every queue has finished its work.
    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.device.device_wait_idle() }.map_err(Error::draw(FrameStage::Idle))
    }
}

impl Deref for LogicalDevice {
    type Target = Device;

    fn deref(&self) -> &Self::Target {
        &self.device
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        debug!("Dropping LogicalDevice");
        unsafe { self.device.destroy_device(None) }
    }
}

pub fn required_device_extensions() -> Vec<String> {
    vec![khr::Swapchain::name().to_string_lossy().into_owned()]
}

/// One create info per distinct queue family, each requesting a single queue.
fn queue_create_infos(
    queue_families: &QueueFamilyIndices,
    queue_priorities: &[f32],
) -> Vec<DeviceQueueCreateInfo> {
    queue_families
        .unique()
        .into_iter()
        .map(|queue_family_index| {
            DeviceQueueCreateInfo::builder()
                .queue_family_index(queue_family_index)
                .queue_priorities(queue_priorities)
                .build()
        })
        .collect()
}
