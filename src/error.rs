//! Error types for the SOAP envelope encoder.

use thiserror::Error;

/// SOAP envelope encoder errors.
///
/// Unsupported value shapes are never errors: the value encoder degrades
/// them to their string form instead.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Namespace resolution was attempted without a definitions model.
    #[error("definitions model is missing, cannot resolve target namespace")]
    DefinitionsMissing,

    /// The Body cannot be opened without both a method and a namespace.
    #[error("method or namespace is empty (method: {method:?}, namespace: {namespace:?})")]
    MissingMethodOrNamespace { method: String, namespace: String },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("WSDL parsing error: {0}")]
    WsdlParse(String),

    /// The token writer or its sink failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Get the stable string code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DefinitionsMissing => "DEFINITIONS_MISSING",
            Self::MissingMethodOrNamespace { .. } => "MISSING_METHOD_OR_NAMESPACE",
            Self::Xml(_) => "XML",
            Self::WsdlParse(_) => "WSDL_PARSE",
            Self::Io(_) => "WRITER_FAILURE",
        }
    }

    pub(crate) fn missing_method_or_namespace(method: &str, namespace: &str) -> Self {
        Self::MissingMethodOrNamespace {
            method: method.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(EncodeError::DefinitionsMissing.code(), "DEFINITIONS_MISSING");
        assert_eq!(
            EncodeError::missing_method_or_namespace("", "urn:t").code(),
            "MISSING_METHOD_OR_NAMESPACE"
        );
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert_eq!(EncodeError::from(io).code(), "WRITER_FAILURE");
    }

    #[test]
    fn test_error_display() {
        let err = EncodeError::missing_method_or_namespace("GetUser", "");
        let msg = err.to_string();
        assert!(msg.contains("method or namespace is empty"));
        assert!(msg.contains("GetUser"));
    }
}
