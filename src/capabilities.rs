//! Checks that requested instance extensions, validation layers and device
//! extensions are reported by the platform before they are enabled.

use std::ffi::{c_char, CStr};

use ash::{vk, Entry, Instance};

use crate::error::{Error, Result};

/// A requirement that was not found among the available names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmet {
    /// Position of the missing name in the requested list
    pub index: usize,
    pub name: String,
}

/// Returns the first requested name, in request order, that is not present in
/// `available`. Comparison is by exact name.
pub fn first_unmet<R, A>(requested: &[R], available: &[A]) -> Option<Unmet>
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    requested
        .iter()
        .enumerate()
        .find(|(_, name)| {
            !available
                .iter()
                .any(|candidate| candidate.as_ref() == name.as_ref())
        })
        .map(|(index, name)| Unmet {
            index,
            name: name.as_ref().to_owned(),
        })
}

pub fn verify_instance_extensions(entry: &Entry, requested: &[String]) -> Result<()> {
    let available = entry
        .enumerate_instance_extension_properties(None)
        .map_err(Error::query("instance extensions"))?
        .iter()
        .map(|properties| name_of(&properties.extension_name))
        .collect::<Vec<_>>();

    match first_unmet(requested, &available) {
        Some(Unmet { index, name }) => Err(Error::MissingInstanceExtension { index, name }),
        None => Ok(()),
    }
}

pub fn verify_validation_layers(entry: &Entry, requested: &[String]) -> Result<()> {
    if requested.is_empty() {
        return Ok(());
    }
    let available = entry
        .enumerate_instance_layer_properties()
        .map_err(Error::query("instance layers"))?
        .iter()
        .map(|properties| name_of(&properties.layer_name))
        .collect::<Vec<_>>();

    match first_unmet(requested, &available) {
        Some(Unmet { index, name }) => Err(Error::MissingValidationLayer { index, name }),
        None => Ok(()),
    }
}

pub fn verify_device_extensions(
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
    requested: &[String],
) -> Result<()> {
    let available = unsafe { instance.enumerate_device_extension_properties(physical_device) }
        .map_err(Error::query("device extensions"))?
        .iter()
        .map(|properties| name_of(&properties.extension_name))
        .collect::<Vec<_>>();

    match first_unmet(requested, &available) {
        Some(Unmet { index, name }) => Err(Error::MissingDeviceExtension { index, name }),
        None => Ok(()),
    }
}

fn name_of(raw: &[c_char]) -> String {
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AVAILABLE: [&str; 4] = [
        "VK_KHR_surface",
        "VK_KHR_xcb_surface",
        "VK_EXT_debug_utils",
        "VK_KHR_wayland_surface",
    ];

    #[test]
    fn empty_request_is_satisfied() {
        let requested: [&str; 0] = [];
        assert_eq!(first_unmet(&requested, &AVAILABLE), None);
        assert_eq!(first_unmet::<_, &str>(&requested, &[]), None);
    }

    #[test]
    fn subset_in_any_order_is_satisfied() {
        let requested = ["VK_EXT_debug_utils", "VK_KHR_surface"];
        assert_eq!(first_unmet(&requested, &AVAILABLE), None);
    }

    #[test]
    fn reports_first_missing_in_request_order() {
        let requested = [
            "VK_KHR_surface",
            "VK_KHR_win32_surface",
            "VK_EXT_debug_utils",
            "VK_KHR_android_surface",
        ];
        assert_eq!(
            first_unmet(&requested, &AVAILABLE),
            Some(Unmet {
                index: 1,
                name: "VK_KHR_win32_surface".to_owned()
            })
        );
    }

    #[test]
    fn match_is_exact() {
        let requested = ["VK_KHR_surface_extra"];
        let unmet = first_unmet(&requested, &AVAILABLE).unwrap();
        assert_eq!(unmet.index, 0);

        let requested = ["vk_khr_surface"];
        assert!(first_unmet(&requested, &AVAILABLE).is_some());
    }

    #[test]
    fn nothing_available_fails_on_first_request() {
        let requested = vec!["VK_KHR_swapchain".to_owned()];
        let available: Vec<String> = vec![];
        assert_eq!(first_unmet(&requested, &available).unwrap().index, 0);
    }

    #[test]
    fn name_of_stops_at_nul() {
        let mut raw = [0 as c_char; 16];
        for (slot, byte) in raw.iter_mut().zip(b"VK_KHR_surface") {
            *slot = *byte as c_char;
        }
        assert_eq!(name_of(&raw), "VK_KHR_surface");
    }
}
