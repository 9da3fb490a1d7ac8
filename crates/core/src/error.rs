/// Result alias that carries the custom [`CarouselError`] type.
pub type Result<T> = std::result::Result<T, CarouselError>;

/// Common error type for the core crate.
///
/// Per-frame update paths are infallible apart from renderer submission, so
/// most variants surface while a session is being assembled.
#[derive(Debug, thiserror::Error)]
pub enum CarouselError {
    /// Free-form message, mostly surfaced by collaborators.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or scene files that fail to parse.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// A configuration value outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The measured slide pitch fell below the configured floor.
    #[error("slide pitch {pitch}px is below the minimum of {floor}px")]
    DegeneratePitch { pitch: f32, floor: f32 },
    /// A scene references an image that was never registered.
    #[error("unknown image asset `{0}` referenced by scene")]
    UnknownAsset(String),
    /// Construction attempted before every slide image decoded.
    #[error("{pending} slide image(s) have not finished decoding")]
    AssetsPending { pending: usize },
    /// The rendering collaborator rejected a frame or a scene.
    #[error("renderer failure: {0}")]
    Render(String),
    /// The render loop was cancelled and cannot be restarted.
    #[error("render loop has been cancelled")]
    LoopCancelled,
}

impl CarouselError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn invalid_config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<&str> for CarouselError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for CarouselError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
