use std::{ffi::CString, ops::Deref};

use ash::{
    extensions::ext::DebugUtils,
    vk::{make_api_version, ApplicationInfo, InstanceCreateInfo, API_VERSION_1_3},
    Entry,
};
use tracing::debug;

use crate::{
    capabilities,
    config::ValidationPolicy,
    error::{Error, Result},
    logging::debug_messenger_create_info,
};

pub const API_VERSION: u32 = API_VERSION_1_3;
const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Owns the Vulkan instance and the loader entry it was created from.
pub struct Instance {
    instance: ash::Instance,
    entry: Entry,
    validation_enabled: bool,
}

impl Instance {
    /// Creates an Instance to interact with the core of Vulkan. Registers the needed extensions and
    /// layers, as well as basic information about the application. Every extension and layer is
    /// verified to be available first.
    pub fn new(
        entry: Entry,
        window_extensions: Vec<String>,
        validation: ValidationPolicy,
    ) -> Result<Self> {
        let appname = CString::new(env!("CARGO_PKG_NAME")).unwrap_or_default();
        let app_version = make_api_version(
            0,
            version_part(env!("CARGO_PKG_VERSION_MAJOR")),
            version_part(env!("CARGO_PKG_VERSION_MINOR")),
            version_part(env!("CARGO_PKG_VERSION_PATCH")),
        );

        let app_info = ApplicationInfo::builder()
            .application_name(&appname)
            .application_version(app_version)
            .api_version(API_VERSION)
            .engine_name(&appname)
            .engine_version(app_version);

        let extension_names = required_instance_extensions(window_extensions, validation);
        debug!("Instance extensions: {:?}", extension_names);
        capabilities::verify_instance_extensions(&entry, &extension_names)?;

        let layer_names = required_layers(validation);
        debug!("Layers to enable: {}", layer_names.join(", "));
        capabilities::verify_validation_layers(&entry, &layer_names)?;

        let extension_names = to_c_strings(&extension_names);
        let extension_name_ptrs = extension_names
            .iter()
            .map(|extension_name| extension_name.as_ptr())
            .collect::<Vec<_>>();
        let layer_names = to_c_strings(&layer_names);
        let layer_name_ptrs = layer_names
            .iter()
            .map(|layer_name| layer_name.as_ptr())
            .collect::<Vec<_>>();

        // also report problems with instance creation and destruction themselves
        let mut debug_create_info = debug_messenger_create_info();
        let mut instance_create_info = InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_name_ptrs)
            .enabled_layer_names(&layer_name_ptrs);
        if validation.layers {
            instance_create_info = instance_create_info.push_next(&mut debug_create_info);
        }

        let instance = unsafe { entry.create_instance(&instance_create_info, None) }
            .map_err(Error::InstanceCreation)?;
        debug!("Instance created");

        Ok(Self {
            instance,
            entry,
            validation_enabled: validation.layers,
        })
    }

    pub fn get_entry(&self) -> &Entry {
        &self.entry
    }

    pub fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        debug!("Dropping Instance");
        unsafe { self.instance.destroy_instance(None) }
    }
}

impl Deref for Instance {
    type Target = ash::Instance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

/// The windowing system's extensions, plus debug utils when validation layers are on.
fn required_instance_extensions(
    mut window_extensions: Vec<String>,
    validation: ValidationPolicy,
) -> Vec<String> {
    if validation.layers {
        window_extensions.push(DebugUtils::name().to_string_lossy().into_owned());
    }
    window_extensions
}

fn required_layers(validation: ValidationPolicy) -> Vec<String> {
    if validation.layers {
        vec![VALIDATION_LAYER.to_owned()]
    } else {
        vec![]
    }
}

/// Names reported by Vulkan or GLFW never contain interior nul bytes; any that
/// do would be rejected by the capability check before reaching this point.
fn to_c_strings(names: &[String]) -> Vec<CString> {
    names
        .iter()
        .filter_map(|name| CString::new(name.as_str()).ok())
        .collect()
}

fn version_part(part: &str) -> u32 {
    part.parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_adds_debug_utils_and_khronos_layer() {
        let window = vec!["VK_KHR_surface".to_owned(), "VK_KHR_xcb_surface".to_owned()];
        let extensions = required_instance_extensions(window, ValidationPolicy::enabled());
        assert_eq!(
            extensions,
            ["VK_KHR_surface", "VK_KHR_xcb_surface", "VK_EXT_debug_utils"]
        );
        assert_eq!(
            required_layers(ValidationPolicy::enabled()),
            [VALIDATION_LAYER]
        );
    }

    #[test]
    fn no_validation_keeps_window_extensions_only() {
        let window = vec!["VK_KHR_surface".to_owned()];
        let extensions = required_instance_extensions(window, ValidationPolicy::disabled());
        assert_eq!(extensions, ["VK_KHR_surface"]);
        assert!(required_layers(ValidationPolicy::disabled()).is_empty());
    }

    #[test]
    fn version_parts_parse() {
        assert_eq!(version_part("3"), 3);
        assert_eq!(version_part("x"), 0);
    }
}
