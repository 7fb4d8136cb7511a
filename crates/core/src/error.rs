#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid job name {name:?}: {reason}")]
    InvalidJobName { name: String, reason: &'static str },

    #[error("Malformed {document} markup: {message}")]
    Markup {
        document: &'static str,
        message: String,
    },
}
