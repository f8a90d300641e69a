use std::ffi::{c_void, CStr};

use ash::vk::{
    self, Bool32, DebugUtilsMessageSeverityFlagsEXT, DebugUtilsMessageTypeFlagsEXT,
    DebugUtilsMessengerCallbackDataEXT, DebugUtilsMessengerCreateInfoEXT,
};
use log::LevelFilter;
use simple_logger::{set_up_color_terminal, SimpleLogger};
use tracing::{event, Level};

pub fn init(level: LevelFilter) -> anyhow::Result<()> {
    set_up_color_terminal();
    let logger = SimpleLogger::new().with_level(level);
    logger.init()?;
    Ok(())
}

/// Messenger settings shared by the instance create info chain and the
/// standalone debug messenger.
pub fn debug_messenger_create_info<'a>() -> vk::DebugUtilsMessengerCreateInfoEXTBuilder<'a> {
    DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            DebugUtilsMessageSeverityFlagsEXT::ERROR
                | DebugUtilsMessageSeverityFlagsEXT::WARNING
                | DebugUtilsMessageSeverityFlagsEXT::INFO
                | DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
        )
        .message_type(
            DebugUtilsMessageTypeFlagsEXT::GENERAL
                | DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
                | DebugUtilsMessageTypeFlagsEXT::VALIDATION,
        )
        .pfn_user_callback(Some(vulkan_debug_utils_callback))
}

unsafe extern "system" fn vulkan_debug_utils_callback(
    message_severity: DebugUtilsMessageSeverityFlagsEXT,
    message_type: DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut c_void,
) -> Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message).to_string_lossy();
    let ty = format!("{:?}", message_type).to_lowercase();

    match severity_level(message_severity) {
        Level::TRACE => event!(Level::TRACE, message = %message, ty = ty),
        Level::INFO => event!(Level::INFO, message = %message, ty = ty),
        Level::WARN => event!(Level::WARN, message = %message, ty = ty),
        _ => event!(Level::ERROR, message = %message, ty = ty),
    }
    // dont skip driver
    vk::FALSE
}

/// Validation severities map onto the tracing level of the same name, with
/// verbose output as trace. Anything unrecognized is treated as an error.
fn severity_level(message_severity: DebugUtilsMessageSeverityFlagsEXT) -> Level {
    match message_severity {
        DebugUtilsMessageSeverityFlagsEXT::VERBOSE => Level::TRACE,
        DebugUtilsMessageSeverityFlagsEXT::INFO => Level::INFO,
        DebugUtilsMessageSeverityFlagsEXT::WARNING => Level::WARN,
        _ => Level::ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_keep_their_level() {
        assert_eq!(
            severity_level(DebugUtilsMessageSeverityFlagsEXT::VERBOSE),
            Level::TRACE
        );
        assert_eq!(
            severity_level(DebugUtilsMessageSeverityFlagsEXT::INFO),
            Level::INFO
        );
        assert_eq!(
            severity_level(DebugUtilsMessageSeverityFlagsEXT::WARNING),
            Level::WARN
        );
        assert_eq!(
            severity_level(DebugUtilsMessageSeverityFlagsEXT::ERROR),
            Level::ERROR
        );
    }

    #[test]
    fn null_callback_data_is_ignored() {
        let skipped = unsafe {
            vulkan_debug_utils_callback(
                DebugUtilsMessageSeverityFlagsEXT::INFO,
                DebugUtilsMessageTypeFlagsEXT::GENERAL,
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(skipped, vk::FALSE);
    }
}
