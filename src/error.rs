//! Error types for Vortex.
//!
//! This module provides error types for configuration parsing, GPU
//! initialization, and running the windowed renderer.

use std::fmt;

/// Errors that can occur while validating a [`crate::VortexConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Background color string is not `#rgb` or `#rrggbb` hex.
    InvalidColor(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidColor(s) => {
                write!(f, "Invalid background color {:?}: expected #rgb or #rrggbb hex", s)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the windowed renderer.
#[derive(Debug)]
pub enum VortexError {
    /// Configuration was rejected before the window opened.
    Config(ConfigError),
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
}

impl fmt::Display for VortexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VortexError::Config(e) => write!(f, "Configuration error: {}", e),
            VortexError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            VortexError::Window(e) => write!(f, "Failed to create window: {}", e),
            VortexError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for VortexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VortexError::Config(e) => Some(e),
            VortexError::EventLoop(e) => Some(e),
            VortexError::Window(e) => Some(e),
            VortexError::Gpu(e) => Some(e),
        }
    }
}

impl From<ConfigError> for VortexError {
    fn from(e: ConfigError) -> Self {
        VortexError::Config(e)
    }
}

impl From<winit::error::EventLoopError> for VortexError {
    fn from(e: winit::error::EventLoopError) -> Self {
        VortexError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for VortexError {
    fn from(e: winit::error::OsError) -> Self {
        VortexError::Window(e)
    }
}

impl From<GpuError> for VortexError {
    fn from(e: GpuError) -> Self {
        VortexError::Gpu(e)
    }
}
