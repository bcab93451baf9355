//! Configuration types for the SOAP envelope encoder.

use crate::token::Attribute;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default tag prefix for the Envelope/Header/Body elements.
pub const DEFAULT_PREFIX: &str = "soap";

/// Main configuration for the encoder binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Config version
    pub version: String,

    /// Envelope wrapper settings
    pub envelope: EnvelopeConfig,

    /// Header element settings
    pub header: HeaderConfig,

    /// Writer output settings
    pub output: OutputConfig,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            envelope: EnvelopeConfig::default(),
            header: HeaderConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Envelope wrapper configuration.
///
/// Set once before encoding starts; encoders read it by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Prefix for Envelope, Header and Body (`<prefix>:Envelope`)
    pub prefix: String,

    /// Attributes for the Envelope start tag. `None` uses the built-in
    /// xsi/xsd/soap namespace declarations; `Some` replaces them entirely.
    pub attributes: Option<Vec<Attribute>>,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            attributes: None,
        }
    }
}

impl EnvelopeConfig {
    /// Replace the envelope defaults.
    ///
    /// The prefix is always overwritten. Attributes are only overwritten when
    /// `Some`; passing `None` keeps whatever was configured before. Neither
    /// value is checked for XML name legality.
    pub fn set_envelope_defaults(
        &mut self,
        prefix: impl Into<String>,
        attributes: Option<Vec<Attribute>>,
    ) {
        self.prefix = prefix.into();
        if let Some(attributes) = attributes {
            debug!(count = attributes.len(), "Custom envelope attributes configured");
            self.attributes = Some(attributes);
        }
        debug!(prefix = %self.prefix, "Envelope prefix configured");
    }

    /// Qualified wrapper element name, e.g. `soap:Body`.
    pub fn element(&self, local: &str) -> String {
        format!("{}:{}", self.prefix, local)
    }
}

/// Header element configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Element wrapping header params inside `<prefix>:Header`.
    /// Empty means header params go directly inside the Header.
    pub name: String,
}

/// Writer output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first
    pub xml_declaration: bool,

    /// Spaces per indent level (0 for compact output)
    pub indent: usize,
}
