//! Error types for the graph crate

/// Graph and identity errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// URN is not of the form `type:id`
    #[error("invalid urn '{0}': expected 'type:id'")]
    InvalidUrn(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_urn_display() {
        let err = GraphError::InvalidUrn("nope".to_string());
        assert!(err.to_string().contains("'nope'"));
    }
}
