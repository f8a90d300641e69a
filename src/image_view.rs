use std::{ops::Deref, rc::Rc};

use ash::vk::{
    self, ComponentMapping, ComponentSwizzle, Format, Image, ImageAspectFlags,
    ImageSubresourceRange, ImageViewCreateInfo, ImageViewType,
};
use tracing::trace;

use crate::{
    error::{Error, Result},
    LogicalDevice,
};

/// The single color mip level and array layer of a swapchain image.
pub const COLOR_SUBRESOURCE_RANGE: ImageSubresourceRange = ImageSubresourceRange {
    aspect_mask: ImageAspectFlags::COLOR,
    base_mip_level: 0,
    level_count: 1,
    base_array_layer: 0,
    layer_count: 1,
};

pub struct ImageView {
    logical_device: Rc<LogicalDevice>,
    image_view: vk::ImageView,
}

impl ImageView {
    /// Creates a 2D color view over `image`. `index` is the image's position in
    /// the swapchain and only used for error reporting.
    pub fn new(
        logical_device: &Rc<LogicalDevice>,
        format: Format,
        image: Image,
        index: usize,
    ) -> Result<Self> {
        let image_view_create_info = ImageViewCreateInfo::builder()
            .image(image)
            // 2D images
            .view_type(ImageViewType::TYPE_2D)
            .format(format)
            // no swizzling
            .components(
                ComponentMapping::builder()
                    .r(ComponentSwizzle::IDENTITY)
                    .g(ComponentSwizzle::IDENTITY)
                    .b(ComponentSwizzle::IDENTITY)
                    .a(ComponentSwizzle::IDENTITY)
                    .build(),
            )
            // color images with no mipmapping or layers
            .subresource_range(COLOR_SUBRESOURCE_RANGE);
        let image_view = unsafe { logical_device.create_image_view(&image_view_create_info, None) }
            .map_err(|result| Error::ImageViewCreation { index, result })?;
        trace!("Image view #{index} created");

        Ok(Self {
            logical_device: Rc::clone(logical_device),
            image_view,
        })
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        unsafe {
            self.logical_device
                .destroy_image_view(self.image_view, None)
        }
    }
}

impl Deref for ImageView {
    type Target = vk::ImageView;

    fn deref(&self) -> &Self::Target {
        &self.image_view
    }
}
