//! SOAP 1.1 envelope assembly.
//!
//! Wraps encoded header and body params in the fixed
//! `Envelope` -> `Header`? -> `Body` -> method element sequence.

use crate::config::EnvelopeConfig;
use crate::encoder::encode_value;
use crate::error::EncodeError;
use crate::token::{Attribute, Token, TokenSequence};
use crate::value::Value;
use tracing::warn;

/// XML Schema instance namespace.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// XML Schema namespace.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
/// SOAP 1.1 envelope namespace.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Envelope attributes used when none are configured, in output order.
pub fn default_envelope_attributes() -> Vec<Attribute> {
    vec![
        Attribute::new("xmlns:xsi", XSI_NS),
        Attribute::new("xmlns:xsd", XSD_NS),
        Attribute::new("xmlns:soap", SOAP_11_NS),
    ]
}

/// Everything needed to assemble one envelope.
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    /// Element wrapping header params (may be empty)
    pub header_name: &'a str,
    /// Header params; `None` omits the Header entirely
    pub header_params: Option<&'a Value>,
    pub body_params: &'a Value,
    /// Method element inside the Body
    pub method: &'a str,
    /// Pre-resolved target namespace
    pub namespace: &'a str,
}

impl<'a> EncodeRequest<'a> {
    pub fn new(method: &'a str, namespace: &'a str, body_params: &'a Value) -> Self {
        Self {
            header_name: "",
            header_params: None,
            body_params,
            method,
            namespace,
        }
    }

    /// Add header params wrapped in `header_name`.
    pub fn with_header(mut self, header_name: &'a str, header_params: &'a Value) -> Self {
        self.header_name = header_name;
        self.header_params = Some(header_params);
        self
    }
}

/// Builds the full token sequence for a SOAP request.
pub struct EnvelopeAssembler<'a> {
    config: &'a EnvelopeConfig,
}

impl<'a> EnvelopeAssembler<'a> {
    pub fn new(config: &'a EnvelopeConfig) -> Self {
        Self { config }
    }

    /// Assemble the envelope for `request`.
    ///
    /// Fails with [`EncodeError::MissingMethodOrNamespace`] when the Body
    /// cannot be opened; the partial sequence is dropped, never returned.
    pub fn assemble(&self, request: &EncodeRequest<'_>) -> Result<TokenSequence, EncodeError> {
        let mut tokens = TokenSequence::new();

        self.open_envelope(&mut tokens);

        if let Some(params) = request.header_params {
            self.write_header(&mut tokens, request.header_name, request.namespace, params);
        }

        self.open_body(&mut tokens, request.method, request.namespace)?;
        encode_value(request.body_params, &mut tokens);
        self.close_body(&mut tokens, request.method);

        tokens.push(Token::close(self.config.element("Envelope")));

        Ok(tokens)
    }

    fn open_envelope(&self, tokens: &mut TokenSequence) {
        let attributes = match self.config.attributes {
            Some(ref custom) => custom.clone(),
            None => default_envelope_attributes(),
        };
        tokens.push(Token::open_with(self.config.element("Envelope"), attributes));
    }

    /// Header wrapper. The inner element is only emitted when both its name
    /// and the namespace are known, and is closed under the same condition.
    fn write_header(
        &self,
        tokens: &mut TokenSequence,
        name: &str,
        namespace: &str,
        params: &Value,
    ) {
        let header = self.config.element("Header");
        let wrap = !name.is_empty() && !namespace.is_empty();

        tokens.push(Token::open(header.as_str()));
        if wrap {
            tokens.push(Token::open_with(name, vec![Attribute::new("xmlns", namespace)]));
        }

        encode_value(params, tokens);

        if wrap {
            tokens.push(Token::close(name));
        }
        tokens.push(Token::close(header));
    }

    fn open_body(
        &self,
        tokens: &mut TokenSequence,
        method: &str,
        namespace: &str,
    ) -> Result<(), EncodeError> {
        if method.is_empty() || namespace.is_empty() {
            warn!(method, namespace, "Cannot open SOAP Body: method or namespace is empty");
            return Err(EncodeError::missing_method_or_namespace(method, namespace));
        }

        tokens.push(Token::open(self.config.element("Body")));
        tokens.push(Token::open_with(method, vec![Attribute::new("xmlns", namespace)]));
        Ok(())
    }

    fn close_body(&self, tokens: &mut TokenSequence, method: &str) {
        tokens.push(Token::close(method));
        tokens.push(Token::close(self.config.element("Body")));
    }
}
