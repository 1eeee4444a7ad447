/// Result alias that carries the custom [`ModalVizError`] type.
pub type Result<T> = std::result::Result<T, ModalVizError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ModalVizError {
    /// The per-axis arrays handed to a mode did not share one length.
    #[error("modal arrays must share one length, got {lengths:?}")]
    LengthMismatch { lengths: [usize; 6] },
    /// A modal set without any modes was supplied where one is required.
    #[error("modal set contains no modes")]
    EmptyModalSet,
    /// The target vertex buffer does not follow the `[x, y, z, r, g, b]` layout.
    #[error("invalid vertex buffer: {0}")]
    InvalidMesh(String),
    /// Free-form error for conditions without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration documents that fail to parse.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl ModalVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ModalVizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ModalVizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
