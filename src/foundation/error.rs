/// Convenience result type used across imprint.
pub type ImprintResult<T> = Result<T, ImprintError>;

/// Top-level error taxonomy used by generation APIs.
///
/// Every variant is fatal for the generation that produced it; degraded-output situations (missing
/// optional fonts, duplicate default families) are logged instead of being returned.
#[derive(thiserror::Error, Debug)]
pub enum ImprintError {
    /// Invalid user-provided scene data (colours, percentages, inline runs, sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// Raw font bytes could not be decoded into a typeface.
    #[error("font decode error: failed to load font '{family}'")]
    FontDecode {
        /// Family the bytes were registered under.
        family: String,
    },

    /// Strict font lookup asked for a family that was never registered.
    #[error("unknown font family '{0}'")]
    UnknownFontFamily(String),

    /// The completion barrier was mutated after it settled.
    #[error("completion barrier is already settled")]
    BarrierAlreadySettled,

    /// The completion barrier was decremented below zero.
    #[error("completion barrier decremented below zero")]
    BarrierUnderflow,

    /// The drawing surface could not be created.
    #[error("surface creation error: {0}")]
    SurfaceCreation(String),

    /// Snapshot/encoding produced no bytes or failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// An asset source could not be loaded.
    #[error("failed to load '{location}': {message}")]
    Load {
        /// Source string as declared in the scene.
        location: String,
        /// Human readable reason.
        message: String,
    },

    /// A draw command failed while executing.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImprintError {
    /// Build a [`ImprintError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ImprintError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ImprintError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ImprintError::SurfaceCreation`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::SurfaceCreation(msg.into())
    }

    /// Build a [`ImprintError::Load`] value.
    pub fn load(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            location: source.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
