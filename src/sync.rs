//! The semaphores and fence a frame synchronizes on.

use std::{ops::Deref, rc::Rc};

use ash::{
    vk::{Fence, FenceCreateFlags, FenceCreateInfo, Semaphore, SemaphoreCreateInfo},
    Device,
};

use crate::{
    error::{Error, Result},
    LogicalDevice,
};

/// A synchronization handle that is destroyed through the device it came from.
pub trait SyncObject: Copy {
    /// # Safety
    /// No pending GPU work may still reference `self`.
    unsafe fn destroy(self, device: &Device);
}

impl SyncObject for Semaphore {
    unsafe fn destroy(self, device: &Device) {
        device.destroy_semaphore(self, None)
    }
}

impl SyncObject for Fence {
    unsafe fn destroy(self, device: &Device) {
        device.destroy_fence(self, None)
    }
}

pub struct SyncGuard<T: SyncObject> {
    handle: T,
    logical_device: Rc<LogicalDevice>,
}

/// GPU-side ordering between acquire, render and present.
pub type SemaphoreGuard = SyncGuard<Semaphore>;
/// Lets the CPU wait for a submission to finish.
pub type FenceGuard = SyncGuard<Fence>;

impl SyncGuard<Semaphore> {
    pub fn new(logical_device: &Rc<LogicalDevice>) -> Result<Self> {
        let create_info = SemaphoreCreateInfo::builder();
        let handle = unsafe { logical_device.create_semaphore(&create_info, None) }
            .map_err(Error::SyncObjectCreation)?;
        Ok(Self {
            handle,
            logical_device: Rc::clone(logical_device),
        })
    }
}

impl SyncGuard<Fence> {
    /// A fence created with `start_signaled` lets the first wait on it return
    /// at once.
    pub fn new(logical_device: &Rc<LogicalDevice>, start_signaled: bool) -> Result<Self> {
        let flags = if start_signaled {
            FenceCreateFlags::SIGNALED
        } else {
            FenceCreateFlags::empty()
        };
        let create_info = FenceCreateInfo::builder().flags(flags);
        let handle = unsafe { logical_device.create_fence(&create_info, None) }
            .map_err(Error::SyncObjectCreation)?;
        Ok(Self {
            handle,
            logical_device: Rc::clone(logical_device),
        })
    }
}

impl<T: SyncObject> Drop for SyncGuard<T> {
    fn drop(&mut self) {
        unsafe { self.handle.destroy(&self.logical_device) }
    }
}

impl<T: SyncObject> Deref for SyncGuard<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
