use std::{ops::Deref, rc::Rc};

use ash::{
    extensions::khr,
    vk::{
        ColorSpaceKHR, CompositeAlphaFlagsKHR, Extent2D, Fence, Format, Image, ImageUsageFlags,
        PhysicalDevice, PresentModeKHR, Semaphore, SharingMode, SurfaceCapabilitiesKHR,
        SurfaceFormatKHR, SwapchainCreateInfoKHR, SwapchainKHR,
    },
};
use tracing::{debug, info};

use crate::{
    error::{Error, FrameStage, Result},
    physical_device::QueueFamilyIndices,
    ImageView, Instance, LogicalDevice, Surface,
};

const PREFERRED_FORMAT: SurfaceFormatKHR = SurfaceFormatKHR {
    format: Format::B8G8R8A8_SRGB,
    color_space: ColorSpaceKHR::SRGB_NONLINEAR,
};
const PREFERRED_PRESENT_MODE: PresentModeKHR = PresentModeKHR::FIFO;

/// Details about what features the swap chain supports for a given surface
#[derive(Debug, Clone)]
pub struct SwapchainSupport {
    pub capabilities: SurfaceCapabilitiesKHR,
    /// The formats (color depth settings) available to use.
    pub formats: Vec<SurfaceFormatKHR>,
    pub present_modes: Vec<PresentModeKHR>,
}

impl SwapchainSupport {
    pub fn query(physical_device: PhysicalDevice, surface: &Surface) -> Result<Self> {
        let capabilities = surface.get_physical_device_surface_capabilities(physical_device)?;
        let formats = surface.get_physical_device_surface_formats(physical_device)?;
        let present_modes = surface.get_physical_device_surface_present_modes(physical_device)?;
        debug!(
            "Surface offers {} format(s) and {} present mode(s)",
            formats.len(),
            present_modes.len()
        );
        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    /// Picks BGRA8 sRGB when offered, then the first sRGB-nonlinear format,
    /// then whatever comes first.
    pub fn choose_surface_format(&self) -> Result<SurfaceFormatKHR> {
        let srgb_formats = || {
            self.formats
                .iter()
                .filter(|format| format.color_space == ColorSpaceKHR::SRGB_NONLINEAR)
        };
        srgb_formats()
            .find(|format| format.format == PREFERRED_FORMAT.format)
            .or_else(|| srgb_formats().next())
            .or_else(|| self.formats.first())
            .copied()
            .ok_or(Error::NoSurfaceFormats)
    }

    /// FIFO (vsync, no tearing) when offered, otherwise the first listed mode.
    pub fn choose_present_mode(&self) -> Result<PresentModeKHR> {
        if self.present_modes.contains(&PREFERRED_PRESENT_MODE) {
            return Ok(PREFERRED_PRESENT_MODE);
        }
        self.present_modes
            .first()
            .copied()
            .ok_or(Error::NoPresentModes)
    }

    /// Returns the "extent" of the images to draw - the resolution to use *in pixels*.
    pub fn choose_extent(&self, requested: Extent2D) -> Extent2D {
        match self.capabilities.current_extent.width {
            // the surface lets the swapchain decide, so use the configured size
            // within the allowed bounds
            u32::MAX => Extent2D {
                width: requested.width.clamp(
                    self.capabilities.min_image_extent.width,
                    self.capabilities.max_image_extent.width,
                ),
                height: requested.height.clamp(
                    self.capabilities.min_image_extent.height,
                    self.capabilities.max_image_extent.height,
                ),
            },
            _ => self.capabilities.current_extent,
        }
    }

    /// One more than the minimum so we're not stuck waiting on the driver,
    /// capped by the maximum when there is one.
    pub fn image_count(&self) -> u32 {
        let min_image_count = self.capabilities.min_image_count;
        let max_image_count = self.capabilities.max_image_count;
        match max_image_count {
            // zero means there is no max
            0 => min_image_count + 1,
            _ => (min_image_count + 1).min(max_image_count),
        }
    }
}

pub fn sharing_mode(queue_families: &QueueFamilyIndices) -> SharingMode {
    if queue_families.is_shared() {
        SharingMode::EXCLUSIVE
    } else {
        SharingMode::CONCURRENT
    }
}

pub struct Swapchain {
    swapchain_fn: khr::Swapchain,
    swapchain_ptr: SwapchainKHR,
    extent: Extent2D,
    surface_format: SurfaceFormatKHR,
    // references we need to keep to ensure
    // we are cleaned up before they are
    _logical_device: Rc<LogicalDevice>,
    _surface: Rc<Surface>,
}

impl Swapchain {
    pub fn new(
        instance: &Instance,
        surface: &Rc<Surface>,
        logical_device: &Rc<LogicalDevice>,
        requested_extent: Extent2D,
    ) -> Result<Self> {
        let support = SwapchainSupport::query(logical_device.get_physical_device(), surface)?;
        let surface_format = support.choose_surface_format()?;
        let present_mode = support.choose_present_mode()?;
        let extent = support.choose_extent(requested_extent);
        let image_count = support.image_count();

        let queue_families = logical_device.get_queue_families();
        let queue_family_indices = queue_families.unique();
        let image_sharing_mode = sharing_mode(queue_families);

        let mut swapchain_create_info = SwapchainCreateInfoKHR::builder()
            .surface(***surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .present_mode(present_mode)
            // always 1 unless doing sterioscopic 3D
            .image_array_layers(1)
            // use images as color attachments for drawing color pictures to
            .image_usage(ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(image_sharing_mode)
            // no transform
            .pre_transform(support.capabilities.current_transform)
            // ignore alpha channel
            .composite_alpha(CompositeAlphaFlagsKHR::OPAQUE)
            // enable clipping, to discard pixels that aren't visible
            .clipped(true)
            .old_swapchain(SwapchainKHR::null());
        if image_sharing_mode == SharingMode::CONCURRENT {
            swapchain_create_info = swapchain_create_info.queue_family_indices(&queue_family_indices);
        }

        let swapchain_fn = khr::Swapchain::new(instance, logical_device);
        let swapchain_ptr = unsafe { swapchain_fn.create_swapchain(&swapchain_create_info, None) }
            .map_err(Error::SwapchainCreation)?;
        info!(
            "Swapchain created: {:?} {:?}, {}x{}, {:?}, {} image(s) requested",
            surface_format.format,
            surface_format.color_space,
            extent.width,
            extent.height,
            present_mode,
            image_count
        );

        Ok(Self {
            swapchain_fn,
            swapchain_ptr,
            extent,
            surface_format,
            _logical_device: Rc::clone(logical_device),
            _surface: Rc::clone(surface),
        })
    }

    /// The images actually created, which may be more than requested.
    pub fn get_swapchain_images(&self) -> Result<Vec<Image>> {
        unsafe { self.swapchain_fn.get_swapchain_images(self.swapchain_ptr) }
            .map_err(Error::query("swapchain images"))
    }

    /// Aquires the index of the next image to use from the swapchain, and registers the
    /// signal semaphore to be signaled when its ready for use.
    pub fn acquire_next_image_index(&self, signal_semaphore: Semaphore) -> Result<u32> {
        let (index, _suboptimal) = unsafe {
            self.swapchain_fn.acquire_next_image(
                self.swapchain_ptr,
                u64::MAX,
                signal_semaphore,
                Fence::null(),
            )
        }
        .map_err(Error::draw(FrameStage::Acquire))?;
        Ok(index)
    }

    pub fn get_handle(&self) -> SwapchainKHR {
        self.swapchain_ptr
    }

    pub fn get_extent(&self) -> Extent2D {
        self.extent
    }

    pub fn get_surface_format(&self) -> SurfaceFormatKHR {
        self.surface_format
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        debug!("Dropping Swapchain");
        unsafe {
            self.swapchain_fn
                .destroy_swapchain(self.swapchain_ptr, None)
        }
    }
}

impl Deref for Swapchain {
    type Target = khr::Swapchain;

    fn deref(&self) -> &Self::Target {
        &self.swapchain_fn
    }
}

/// The swapchain together with its images and one view per image. Views are
/// declared first so they are released before the swapchain.
pub struct PresentationChain {
    image_views: Vec<ImageView>,
    images: Vec<Image>,
    swapchain: Swapchain,
}

impl PresentationChain {
    pub fn new(
        instance: &Instance,
        surface: &Rc<Surface>,
        logical_device: &Rc<LogicalDevice>,
        requested_extent: Extent2D,
    ) -> Result<Self> {
        let swapchain = Swapchain::new(instance, surface, logical_device, requested_extent)?;
        let images = swapchain.get_swapchain_images()?;
        let format = swapchain.get_surface_format().format;
        let image_views = images
            .iter()
            .enumerate()
            .map(|(index, image)| ImageView::new(logical_device, format, *image, index))
            .collect::<Result<Vec<_>>>()?;
        debug!("{} swapchain image(s) with views", images.len());

        Ok(Self {
            image_views,
            images,
            swapchain,
        })
    }

    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn image(&self, index: usize) -> Image {
        self.images[index]
    }

    pub fn image_view(&self, index: usize) -> &ImageView {
        &self.image_views[index]
    }
}
