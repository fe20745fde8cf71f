//! Error types for the platform boundaries
//!
//! Neither error class is fatal: a render failure skips the frame, an audio
//! failure drops the cue.

use core::fmt;

#[derive(Debug)]
pub enum RenderError {
    /// No GPU adapter matched the surface
    NoAdapter,
    RequestDevice(wgpu::RequestDeviceError),
    /// Canvas could not be turned into a surface
    CreateSurface(String),
    /// Surface reports no usable texture format
    UnsupportedSurface,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAdapter => write!(f, "no compatible GPU adapter found"),
            Self::RequestDevice(e) => write!(f, "failed to request GPU device: {e}"),
            Self::CreateSurface(msg) => write!(f, "failed to create render surface: {msg}"),
            Self::UnsupportedSurface => write!(f, "surface has no supported texture format"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RequestDevice(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        Self::RequestDevice(e)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioError {
    /// No AudioContext (insecure context, unsupported browser, native build)
    ContextUnavailable,
    /// Oscillator or gain node could not be created or connected
    Node(String),
    /// Start/stop or parameter ramp was rejected
    Schedule(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextUnavailable => write!(f, "audio context unavailable"),
            Self::Node(msg) => write!(f, "audio node error: {msg}"),
            Self::Schedule(msg) => write!(f, "audio scheduling error: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            RenderError::NoAdapter.to_string(),
            "no compatible GPU adapter found"
        );
        assert_eq!(
            AudioError::Node("gain".into()).to_string(),
            "audio node error: gain"
        );
    }
}
