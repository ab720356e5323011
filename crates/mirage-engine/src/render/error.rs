use thiserror::Error;

/// Failures of GPU object creation and draw submission.
///
/// Creation failures are fatal for the scene that hit them; nothing retries.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("shader program `{label}` failed to build: {message}")]
    ShaderCompile { label: String, message: String },

    #[error("framebuffer {width}x{height} is incomplete: {reason}")]
    FramebufferIncomplete {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("failed to create {what}: {message}")]
    ResourceCreation { what: &'static str, message: String },

    #[error("unknown {kind} handle #{id}")]
    UnknownHandle { kind: &'static str, id: u32 },

    #[error("no frame is active; surface draws must happen between begin_frame and end_frame")]
    NoActiveFrame,

    #[error("invalid program description `{label}`: {reason}")]
    InvalidProgramDesc { label: String, reason: String },

    #[error("draw with `{label}` passed {actual} uniform bytes, program expects {expected}")]
    UniformSize {
        label: String,
        expected: u64,
        actual: u64,
    },

    #[error("draw with `{label}` samples the framebuffer it writes")]
    FeedbackLoop { label: String },

    #[error("draw with `{label}` is missing its sampled texture")]
    MissingTexture { label: String },
}
