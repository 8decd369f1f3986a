//! Outbound messages.

use rollcall_verify::chunk_message;

/// One reply to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text
    Text(String),
    /// Preformatted text, sent inside a fenced code block
    Block(String),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn block(text: impl Into<String>) -> Self {
        Self::Block(text.into())
    }

    /// The raw text, without fences.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) | Self::Block(text) => text,
        }
    }

    /// Split into transport messages of at most `max_chars` characters of
    /// content each. Blocks are fenced per chunk.
    pub fn into_messages(self, max_chars: usize) -> Vec<String> {
        match self {
            Self::Text(text) => chunk_message(&text, max_chars),
            Self::Block(text) => chunk_message(&text, max_chars)
                .into_iter()
                .map(|chunk| format!("```\n{chunk}\n```"))
                .collect(),
        }
    }
}
