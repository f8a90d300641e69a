use ash::vk::{self, QueueFamilyProperties, QueueFlags};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    instance::API_VERSION,
    Instance, Surface,
};

/// Takes the first device the platform enumerates. There is no ranking of
/// candidates.
pub fn select_physical_device(candidates: &[vk::PhysicalDevice]) -> Result<vk::PhysicalDevice> {
    candidates.first().copied().ok_or(Error::NoPhysicalDevices)
}

pub fn pick_physical_device(instance: &Instance) -> Result<vk::PhysicalDevice> {
    let physical_devices = unsafe { instance.enumerate_physical_devices() }
        .map_err(Error::query("physical devices"))?;
    debug!("{} physical device(s) found", physical_devices.len());
    let physical_device = select_physical_device(&physical_devices)?;

    let properties = unsafe { instance.get_physical_device_properties(physical_device) };
    let name = unsafe { std::ffi::CStr::from_ptr(properties.device_name.as_ptr()) };
    info!("Using physical device {:?}", name);
    check_api_version(properties.api_version)?;
    Ok(physical_device)
}

/// Dynamic rendering is core from Vulkan 1.3 on.
fn check_api_version(found: u32) -> Result<()> {
    if found < API_VERSION {
        return Err(Error::UnsupportedApiVersion {
            required: format_version(API_VERSION),
            found: format_version(found),
        });
    }
    Ok(())
}

fn format_version(version: u32) -> String {
    format!(
        "{}.{}.{}",
        vk::api_version_major(version),
        vk::api_version_minor(version),
        vk::api_version_patch(version)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// family capable of running graphics related commands
    pub graphics_family: u32,
    /// family capable of displaying results on the surface
    pub present_family: u32,
}

impl QueueFamilyIndices {
    pub fn find(
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        surface: &Surface,
    ) -> Result<Self> {
        let queue_family_properties =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) };
        let graphics_family = find_graphics_family(&queue_family_properties)?;
        let present_family = find_present_family(queue_family_properties.len(), |index| {
            surface.get_physical_device_surface_support(physical_device, index)
        })?;
        let indices = Self {
            graphics_family,
            present_family,
        };
        debug!("Queue family indices: {:?}", indices);
        Ok(indices)
    }

    pub fn is_shared(&self) -> bool {
        self.graphics_family == self.present_family
    }

    /// The distinct families, graphics first. One queue is requested per entry.
    pub fn unique(&self) -> Vec<u32> {
        if self.is_shared() {
            vec![self.graphics_family]
        } else {
            vec![self.graphics_family, self.present_family]
        }
    }
}

pub fn find_graphics_family(queue_family_properties: &[QueueFamilyProperties]) -> Result<u32> {
    queue_family_properties
        .iter()
        .position(|properties| properties.queue_flags.contains(QueueFlags::GRAPHICS))
        .map(|index| index as u32)
        .ok_or(Error::NoGraphicsQueueFamily)
}

/// Asks `supports_present` for each family in order and returns the first
/// affirmed one. A failed query aborts the search.
pub fn find_present_family<F>(family_count: usize, mut supports_present: F) -> Result<u32>
where
    F: FnMut(u32) -> Result<bool>,
{
    for index in 0..family_count as u32 {
        if supports_present(index)? {
            return Ok(index);
        }
    }
    Err(Error::NoPresentQueueFamily)
}

#[cfg(test)]
mod tests {
    use ash::vk::Handle;

    use super::*;
    use crate::error::ErrorKind;

    fn family(queue_flags: QueueFlags) -> QueueFamilyProperties {
        QueueFamilyProperties {
            queue_flags,
            queue_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn no_devices_fails_with_no_physical_devices() {
        let err = select_physical_device(&[]).unwrap_err();
        assert!(matches!(err, Error::NoPhysicalDevices));
        assert_eq!(err.kind(), ErrorKind::CapabilityUnmet);
    }

    #[test]
    fn first_enumerated_device_wins() {
        let devices = [
            vk::PhysicalDevice::from_raw(7),
            vk::PhysicalDevice::from_raw(3),
        ];
        assert_eq!(select_physical_device(&devices).unwrap(), devices[0]);
    }

    #[test]
    fn graphics_family_is_first_with_graphics_bit() {
        let families = [
            family(QueueFlags::TRANSFER),
            family(QueueFlags::COMPUTE | QueueFlags::TRANSFER),
            family(QueueFlags::GRAPHICS | QueueFlags::COMPUTE),
            family(QueueFlags::GRAPHICS),
        ];
        assert_eq!(find_graphics_family(&families).unwrap(), 2);
    }

    #[test]
    fn missing_graphics_family_fails() {
        let families = [family(QueueFlags::COMPUTE)];
        assert!(matches!(
            find_graphics_family(&families),
            Err(Error::NoGraphicsQueueFamily)
        ));
        assert!(matches!(
            find_graphics_family(&[]),
            Err(Error::NoGraphicsQueueFamily)
        ));
    }

    #[test]
    fn present_family_is_first_affirmed() {
        let mut asked = vec![];
        let index = find_present_family(4, |index| {
            asked.push(index);
            Ok(index >= 1)
        })
        .unwrap();
        assert_eq!(index, 1);
        assert_eq!(asked, [0, 1]);
    }

    #[test]
    fn missing_present_family_fails() {
        let err = find_present_family(3, |_| Ok(false)).unwrap_err();
        assert!(matches!(err, Error::NoPresentQueueFamily));
    }

    #[test]
    fn present_query_failure_propagates() {
        let err = find_present_family(3, |_| {
            Err(Error::query("surface support")(
                vk::Result::ERROR_SURFACE_LOST_KHR,
            ))
        })
        .unwrap_err();
        assert!(matches!(err, Error::Query { .. }));
    }

    #[test]
    fn shared_family_requests_one_queue() {
        let indices = QueueFamilyIndices {
            graphics_family: 0,
            present_family: 0,
        };
        assert!(indices.is_shared());
        assert_eq!(indices.unique(), [0]);
    }

    #[test]
    fn distinct_families_request_two_queues() {
        let indices = QueueFamilyIndices {
            graphics_family: 0,
            present_family: 2,
        };
        assert!(!indices.is_shared());
        assert_eq!(indices.unique(), [0, 2]);
    }

    #[test]
    fn old_api_versions_are_rejected() {
        assert!(check_api_version(vk::API_VERSION_1_3).is_ok());
        assert!(check_api_version(vk::make_api_version(0, 1, 3, 250)).is_ok());
        let err = check_api_version(vk::API_VERSION_1_2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "device supports Vulkan 1.2.0, 1.3.0 is required"
        );
    }
}
