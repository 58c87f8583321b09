//! Device-dependent resource lifecycle.
//!
//! GPU objects die with their device. The context owns them behind an
//! `Option` so a lost device drops everything at once, and a restore
//! rebuilds from scratch at the last known size.

use roomfly_bloom::BloomError;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("graphics device lost")]
    DeviceLost,
    #[error("device resources not created")]
    NotReady,
    #[error("surface error: {0}")]
    Surface(String),
    #[error("resource creation failed: {0}")]
    Resource(String),
    #[error(transparent)]
    Bloom(#[from] BloomError),
}

/// Everything that must be rebuilt when the device changes.
pub trait DeviceResources: Sized {
    /// Handle to whatever creates the resources.
    type Device;

    fn create(device: &Self::Device, width: u32, height: u32) -> Result<Self, RenderError>;

    /// Rebuild size-dependent resources. Sizes are non-zero.
    fn resize(
        &mut self,
        device: &Self::Device,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Uninitialized,
    Ready,
    Lost,
}

pub struct GraphicsContext<R: DeviceResources> {
    resources: Option<R>,
    width: u32,
    height: u32,
    state: DeviceState,
    restores: u32,
}

impl<R: DeviceResources> GraphicsContext<R> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resources: None,
            width: width.max(1),
            height: height.max(1),
            state: DeviceState::Uninitialized,
            restores: 0,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// How many times resources were rebuilt after a device loss.
    pub fn restore_count(&self) -> u32 {
        self.restores
    }

    pub fn resources(&self) -> Result<&R, RenderError> {
        match self.state {
            DeviceState::Ready => self.resources.as_ref().ok_or(RenderError::NotReady),
            DeviceState::Lost => Err(RenderError::DeviceLost),
            DeviceState::Uninitialized => Err(RenderError::NotReady),
        }
    }

    pub fn resources_mut(&mut self) -> Result<&mut R, RenderError> {
        match self.state {
            DeviceState::Ready => self.resources.as_mut().ok_or(RenderError::NotReady),
            DeviceState::Lost => Err(RenderError::DeviceLost),
            DeviceState::Uninitialized => Err(RenderError::NotReady),
        }
    }

    pub fn create(&mut self, device: &R::Device) -> Result<(), RenderError> {
        let resources = R::create(device, self.width, self.height)?;
        self.resources = Some(resources);
        self.state = DeviceState::Ready;
        info!(width = self.width, height = self.height, "device resources created");
        Ok(())
    }

    /// Track the new size. Zero sizes are ignored and the old resources
    /// stay until a usable size arrives.
    pub fn resize(
        &mut self,
        device: &R::Device,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        if let (DeviceState::Ready, Some(resources)) = (self.state, self.resources.as_mut()) {
            resources.resize(device, width, height)?;
        }
        Ok(())
    }

    /// Release every device-dependent resource.
    pub fn on_device_lost(&mut self) {
        warn!("graphics device lost, releasing resources");
        self.resources = None;
        self.state = DeviceState::Lost;
    }

    /// Rebuild all resources on a fresh device at the last known size.
    pub fn on_device_restored(&mut self, device: &R::Device) -> Result<(), RenderError> {
        self.create(device)?;
        self.restores += 1;
        info!(restores = self.restores, "graphics device restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct MockDevice {
        created: Cell<u32>,
        fail: Cell<bool>,
    }

    struct MockResources {
        size: (u32, u32),
        resized: u32,
    }

    impl DeviceResources for MockResources {
        type Device = MockDevice;

        fn create(device: &MockDevice, width: u32, height: u32) -> Result<Self, RenderError> {
            if device.fail.get() {
                return Err(RenderError::Resource("mock failure".into()));
            }
            device.created.set(device.created.get() + 1);
            Ok(Self {
                size: (width, height),
                resized: 0,
            })
        }

        fn resize(
            &mut self,
            _device: &MockDevice,
            width: u32,
            height: u32,
        ) -> Result<(), RenderError> {
            self.size = (width, height);
            self.resized += 1;
            Ok(())
        }
    }

    #[test]
    fn not_ready_before_create() {
        let ctx: GraphicsContext<MockResources> = GraphicsContext::new(800, 600);
        assert_eq!(ctx.state(), DeviceState::Uninitialized);
        assert!(matches!(ctx.resources(), Err(RenderError::NotReady)));
    }

    #[test]
    fn create_and_resize() {
        let device = MockDevice::default();
        let mut ctx: GraphicsContext<MockResources> = GraphicsContext::new(800, 600);
        ctx.create(&device).unwrap();
        assert_eq!(ctx.resources().unwrap().size, (800, 600));

        ctx.resize(&device, 1024, 768).unwrap();
        assert_eq!(ctx.resources().unwrap().size, (1024, 768));
        assert_eq!(ctx.resources().unwrap().resized, 1);

        // Minimised and unchanged sizes are ignored.
        ctx.resize(&device, 0, 768).unwrap();
        ctx.resize(&device, 1024, 768).unwrap();
        assert_eq!(ctx.resources().unwrap().resized, 1);
        assert_eq!(ctx.size(), (1024, 768));
    }

    #[test]
    fn lost_then_restored_rebuilds_at_last_size() {
        let device = MockDevice::default();
        let mut ctx: GraphicsContext<MockResources> = GraphicsContext::new(800, 600);
        ctx.create(&device).unwrap();
        ctx.on_device_lost();
        assert_eq!(ctx.state(), DeviceState::Lost);
        assert!(matches!(ctx.resources(), Err(RenderError::DeviceLost)));

        // Size changes while lost are remembered.
        ctx.resize(&device, 640, 480).unwrap();

        let fresh = MockDevice::default();
        ctx.on_device_restored(&fresh).unwrap();
        assert_eq!(ctx.state(), DeviceState::Ready);
        assert_eq!(ctx.resources().unwrap().size, (640, 480));
        assert_eq!(fresh.created.get(), 1);
        assert_eq!(ctx.restore_count(), 1);
    }

    #[test]
    fn failed_restore_stays_lost() {
        let device = MockDevice::default();
        let mut ctx: GraphicsContext<MockResources> = GraphicsContext::new(800, 600);
        ctx.create(&device).unwrap();
        ctx.on_device_lost();

        device.fail.set(true);
        assert!(ctx.on_device_restored(&device).is_err());
        assert_eq!(ctx.state(), DeviceState::Lost);
        assert_eq!(ctx.restore_count(), 0);
    }
}
