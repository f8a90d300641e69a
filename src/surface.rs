use std::{ops::Deref, rc::Rc};

use ash::{
    extensions::khr,
    vk::{PhysicalDevice, PresentModeKHR, SurfaceCapabilitiesKHR, SurfaceFormatKHR, SurfaceKHR},
};
use tracing::debug;

use crate::{
    error::{Error, Result},
    Instance, Window,
};

pub struct Surface {
    surface_fn: khr::Surface,
    surface_ptr: SurfaceKHR,
    // references to make sure we are dropped before these
    _instance: Rc<Instance>,
}

impl Surface {
    pub fn new(instance: &Rc<Instance>, window: &Window) -> Result<Self> {
        let surface_fn = khr::Surface::new(instance.get_entry(), instance);
        let surface_ptr = window.create_surface(instance)?;
        debug!("Surface created");
        Ok(Self {
            surface_fn,
            surface_ptr,
            _instance: Rc::clone(instance),
        })
    }

    pub(crate) fn get_physical_device_surface_capabilities(
        &self,
        physical_device: PhysicalDevice,
    ) -> Result<SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_capabilities(physical_device, self.surface_ptr)
        }
        .map_err(Error::query("surface capabilities"))
    }

    pub(crate) fn get_physical_device_surface_formats(
        &self,
        physical_device: PhysicalDevice,
    ) -> Result<Vec<SurfaceFormatKHR>> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_formats(physical_device, self.surface_ptr)
        }
        .map_err(Error::query("surface formats"))
    }

    pub(crate) fn get_physical_device_surface_present_modes(
        &self,
        physical_device: PhysicalDevice,
    ) -> Result<Vec<PresentModeKHR>> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_present_modes(physical_device, self.surface_ptr)
        }
        .map_err(Error::query("surface present modes"))
    }

    pub(crate) fn get_physical_device_surface_support(
        &self,
        physical_device: PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool> {
        unsafe {
            self.surface_fn.get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                self.surface_ptr,
            )
        }
        .map_err(Error::query("surface support"))
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        debug!("Dropping Surface");
        unsafe { self.surface_fn.destroy_surface(self.surface_ptr, None) }
    }
}

impl Deref for Surface {
    type Target = SurfaceKHR;

    fn deref(&self) -> &Self::Target {
        &self.surface_ptr
    }
}
