//! Content parts sent to the model

/// One piece of user content in a model request
///
/// Binary payloads are already base64-encoded; the provider only wraps them
/// in its wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain text
    Text(String),

    /// A binary document such as a PDF
    File {
        /// File name shown to the model
        filename: String,
        /// MIME type (e.g. "application/pdf")
        media_type: String,
        /// Base64-encoded bytes
        data: String,
    },

    /// An image
    Image {
        /// MIME type (e.g. "image/png")
        media_type: String,
        /// Base64-encoded bytes
        data: String,
    },
}

impl ContentPart {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    /// The text of a text part, `None` for binary parts
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Declared media type
    pub fn media_type(&self) -> &str {
        match self {
            ContentPart::Text(_) => "text/plain",
            ContentPart::File { media_type, .. } | ContentPart::Image { media_type, .. } => {
                media_type
            }
        }
    }
}
