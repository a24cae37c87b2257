//! Graphics instance.
//!
//! The [`GraphicsInstance`] is the top-level entry point for the graphics
//! system. It manages one or more [`GraphicsDevice`]s.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::device::{DeviceCapabilities, GraphicsDevice};
use crate::error::GraphicsError;

/// The graphics instance manages devices.
///
/// # Example
///
/// ```
/// use auriga_graphics::GraphicsInstance;
///
/// let instance = GraphicsInstance::new().unwrap();
/// let device = instance.create_device().unwrap();
/// assert!(device.buffer_count() == 0);
/// ```
pub struct GraphicsInstance {
    devices: RwLock<Vec<Arc<GraphicsDevice>>>,
}

impl GraphicsInstance {
    /// Create a new graphics instance.
    pub fn new() -> Result<Arc<Self>, GraphicsError> {
        log::info!("Creating GraphicsInstance");
        Ok(Arc::new(Self {
            devices: RwLock::new(Vec::new()),
        }))
    }

    /// Create a graphics device with default capabilities.
    pub fn create_device(&self) -> Result<Arc<GraphicsDevice>, GraphicsError> {
        self.create_device_with_capabilities(DeviceCapabilities::default())
    }

    /// Create a graphics device with explicit capabilities.
    ///
    /// Capability overrides are how tests and headless tools model hardware
    /// differences such as missing compressed-texture support.
    pub fn create_device_with_capabilities(
        &self,
        capabilities: DeviceCapabilities,
    ) -> Result<Arc<GraphicsDevice>, GraphicsError> {
        let device = Arc::new(GraphicsDevice::new(
            "Software Adapter".to_string(),
            capabilities,
        ));
        self.devices.write().push(Arc::clone(&device));

        log::info!("Created device: {}", device.name());

        Ok(device)
    }

    /// Number of devices created by this instance.
    pub fn device_count(&self) -> usize {
        self.devices.read().len()
    }
}

static_assertions::assert_impl_all!(GraphicsInstance: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_device() {
        let instance = GraphicsInstance::new().unwrap();
        let device = instance.create_device().unwrap();
        assert_eq!(device.name(), "Software Adapter");
        assert_eq!(instance.device_count(), 1);
    }

    #[test]
    fn test_capability_override() {
        let instance = GraphicsInstance::new().unwrap();
        let device = instance
            .create_device_with_capabilities(DeviceCapabilities {
                texture_compression_astc: true,
                ..Default::default()
            })
            .unwrap();
        assert!(device.capabilities().texture_compression_astc);
    }
}
