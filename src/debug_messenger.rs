use std::rc::Rc;

use ash::{extensions::ext::DebugUtils, vk::DebugUtilsMessengerEXT};
use tracing::debug;

use crate::{
    error::{Error, Result},
    logging::debug_messenger_create_info,
    Instance,
};

/// RAII for the debug utils messenger that routes validation output into tracing
pub struct DebugMessenger {
    debug_utils: DebugUtils,
    messenger: DebugUtilsMessengerEXT,
    // need to keep a reference to instance to ensure we get dropped before instance does
    _instance: Rc<Instance>,
}

impl DebugMessenger {
    /// Only creates the messenger when the instance was built with validation layers.
    pub fn new(instance: &Rc<Instance>) -> Result<Option<Self>> {
        if !instance.validation_enabled() {
            return Ok(None);
        }
        let create_info = debug_messenger_create_info();
        let debug_utils = DebugUtils::new(instance.get_entry(), instance);
        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .map_err(Error::DebugMessengerCreation)?;
        debug!("Debug messenger created");
        Ok(Some(Self {
            debug_utils,
            messenger,
            _instance: Rc::clone(instance),
        }))
    }
}

impl Drop for DebugMessenger {
    fn drop(&mut self) {
        debug!("Dropping DebugMessenger");
        unsafe {
            self.debug_utils
                .destroy_debug_utils_messenger(self.messenger, None)
        }
    }
}
