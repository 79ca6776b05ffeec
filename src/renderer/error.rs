use std::fmt;

/// GPU setup failures
#[derive(Debug)]
pub enum RenderError {
    /// A view or target was requested with a zero dimension
    ZeroSized { label: &'static str },
    /// A dimension exceeds the device texture limit
    TooLarge {
        label: &'static str,
        width: u32,
        height: u32,
        max: u32,
    },
    /// The output format cannot be rendered to
    UnsupportedFormat(wgpu::TextureFormat),
    /// No adapter matched the request
    NoAdapter(wgpu::RequestAdapterError),
    /// The adapter refused to create a device
    Device(wgpu::RequestDeviceError),
    /// The device lacks something a stage needs
    MissingCapability(&'static str),
    /// Shader compilation or pipeline validation failed
    Shader {
        stage: &'static str,
        message: String,
    },
    /// Unknown view handle
    UnknownView(usize),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ZeroSized { label } => write!(f, "{label}: zero-sized target"),
            RenderError::TooLarge {
                label,
                width,
                height,
                max,
            } => write!(f, "{label}: {width}x{height} exceeds device limit {max}"),
            RenderError::UnsupportedFormat(format) => {
                write!(f, "output format {format:?} is not renderable")
            }
            RenderError::NoAdapter(err) => write!(f, "no suitable GPU adapter: {err}"),
            RenderError::Device(err) => write!(f, "device request failed: {err}"),
            RenderError::MissingCapability(what) => write!(f, "device lacks {what}"),
            RenderError::Shader { stage, message } => {
                write!(f, "{stage} shaders failed validation: {message}")
            }
            RenderError::UnknownView(id) => write!(f, "no map view with id {id}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        RenderError::Device(err)
    }
}

impl From<wgpu::RequestAdapterError> for RenderError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        RenderError::NoAdapter(err)
    }
}

/// Run `build` inside a validation error scope
///
/// Shader parse errors and pipeline validation errors raised while building
/// come back as [`RenderError::Shader`] instead of reaching the device's
/// uncaptured-error handler.
pub async fn capture_validation<T>(
    device: &wgpu::Device,
    stage: &'static str,
    build: impl FnOnce() -> T,
) -> Result<T, RenderError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    match scope.pop().await {
        Some(err) => Err(RenderError::Shader {
            stage,
            message: err.to_string(),
        }),
        None => Ok(value),
    }
}

/// Validate a target size against the device limit
pub fn check_size(
    device: &wgpu::Device,
    label: &'static str,
    width: u32,
    height: u32,
) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::ZeroSized { label });
    }
    let max = device.limits().max_texture_dimension_2d;
    if width > max || height > max {
        return Err(RenderError::TooLarge {
            label,
            width,
            height,
            max,
        });
    }
    Ok(())
}

/// Reject formats no color pass can write to
pub fn check_output_format(format: wgpu::TextureFormat) -> Result<(), RenderError> {
    if format.is_depth_stencil_format() || format.is_compressed() {
        return Err(RenderError::UnsupportedFormat(format));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RenderError::ZeroSized { label: "scene" };
        assert_eq!(err.to_string(), "scene: zero-sized target");
        let err = RenderError::UnsupportedFormat(wgpu::TextureFormat::Depth32Float);
        assert!(err.to_string().contains("Depth32Float"));
        let err = RenderError::Shader {
            stage: "crt",
            message: "unknown identifier".into(),
        };
        assert_eq!(
            err.to_string(),
            "crt shaders failed validation: unknown identifier"
        );
    }

    #[test]
    fn test_output_format_check() {
        assert!(check_output_format(wgpu::TextureFormat::Bgra8UnormSrgb).is_ok());
        assert!(check_output_format(wgpu::TextureFormat::Rgba8Unorm).is_ok());
        assert!(check_output_format(wgpu::TextureFormat::Depth24Plus).is_err());
        assert!(check_output_format(wgpu::TextureFormat::Bc1RgbaUnorm).is_err());
    }
}
