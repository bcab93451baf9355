//! SOAP request encoder.
//!
//! Ties namespace resolution, envelope assembly and the XML writer together.

use crate::config::{EncoderConfig, EnvelopeConfig, OutputConfig};
use crate::envelope::{EncodeRequest, EnvelopeAssembler};
use crate::error::EncodeError;
use crate::token::TokenSequence;
use crate::value::Value;
use crate::wsdl::{resolve_namespace, Definitions};
use quick_xml::events::{BytesDecl, Event};
use quick_xml::Writer;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// One SOAP method invocation to encode.
#[derive(Debug, Clone)]
pub struct SoapCall {
    /// Method element name inside the Body
    pub method: String,
    /// Body params
    pub params: Value,
    /// Header params; `None` omits the Header
    pub header_params: Option<Value>,
}

impl SoapCall {
    pub fn new(method: impl Into<String>, params: impl Into<Value>) -> Self {
        Self {
            method: method.into(),
            params: params.into(),
            header_params: None,
        }
    }

    pub fn with_header(mut self, header_params: impl Into<Value>) -> Self {
        self.header_params = Some(header_params.into());
        self
    }
}

/// Encode counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub calls_encoded: u64,
    pub calls_failed: u64,
}

/// Encodes [`SoapCall`]s into SOAP 1.1 envelopes.
///
/// Configuration is fixed at construction, so one encoder can be shared
/// between threads.
pub struct SoapRequestEncoder {
    envelope: EnvelopeConfig,
    header_name: String,
    output: OutputConfig,
    definitions: Option<Definitions>,
    namespace_override: Option<String>,
    calls_encoded: AtomicU64,
    calls_failed: AtomicU64,
}

impl SoapRequestEncoder {
    /// Create a new encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            envelope: config.envelope,
            header_name: config.header.name,
            output: config.output,
            definitions: None,
            namespace_override: None,
            calls_encoded: AtomicU64::new(0),
            calls_failed: AtomicU64::new(0),
        }
    }

    /// Resolve the target namespace from these definitions.
    pub fn with_definitions(mut self, definitions: Definitions) -> Self {
        self.definitions = Some(definitions);
        self
    }

    /// Use a fixed namespace instead of resolving one from definitions.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace_override = Some(namespace.into());
        self
    }

    /// Effective target namespace for every call.
    pub fn namespace(&self) -> Result<String, EncodeError> {
        match self.namespace_override {
            Some(ref namespace) => Ok(namespace.clone()),
            None => resolve_namespace(self.definitions.as_ref()),
        }
    }

    /// Build the complete token sequence for `call`.
    ///
    /// Either every token is produced or an error is returned; nothing is
    /// written anywhere.
    pub fn encode(&self, call: &SoapCall) -> Result<TokenSequence, EncodeError> {
        let result = self.assemble(call);
        if let Ok(ref tokens) = result {
            debug!(method = %call.method, tokens = tokens.len(), "SOAP call assembled");
        }
        self.record(call, result)
    }

    /// Encode `call` and write it to `sink`.
    ///
    /// Assembly completes before the first byte is written. A writer error
    /// stops output immediately and may leave a partial document in `sink`.
    /// The call counts as encoded only once the writer has flushed.
    pub fn write_call<W: Write>(&self, call: &SoapCall, sink: W) -> Result<(), EncodeError> {
        let result = self.assemble(call).and_then(|tokens| {
            let mut writer = if self.output.indent > 0 {
                Writer::new_with_indent(sink, b' ', self.output.indent)
            } else {
                Writer::new(sink)
            };
            self.write_tokens(tokens, &mut writer)
        });
        self.record(call, result)
    }

    /// Encode `call` into an XML document string.
    pub fn to_xml_string(&self, call: &SoapCall) -> Result<String, EncodeError> {
        let mut buf = Vec::new();
        self.write_call(call, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| EncodeError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Snapshot of the encode counters.
    pub fn stats(&self) -> EncodeStats {
        EncodeStats {
            calls_encoded: self.calls_encoded.load(Ordering::Relaxed),
            calls_failed: self.calls_failed.load(Ordering::Relaxed),
        }
    }

    /// Count one finished call, successful or not.
    fn record<T>(&self, call: &SoapCall, result: Result<T, EncodeError>) -> Result<T, EncodeError> {
        match result {
            Ok(_) => {
                self.calls_encoded.fetch_add(1, Ordering::Relaxed);
                debug!(method = %call.method, "SOAP call encoded");
            }
            Err(ref e) => {
                self.calls_failed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    method = %call.method,
                    code = e.code(),
                    error = %e,
                    "SOAP call encoding failed"
                );
            }
        }
        result
    }

    fn assemble(&self, call: &SoapCall) -> Result<TokenSequence, EncodeError> {
        let namespace = self.namespace()?;

        let mut request = EncodeRequest::new(&call.method, &namespace, &call.params);
        if let Some(ref header) = call.header_params {
            request = request.with_header(&self.header_name, header);
        }

        EnvelopeAssembler::new(&self.envelope).assemble(&request)
    }

    fn write_tokens<W: Write>(
        &self,
        tokens: TokenSequence,
        writer: &mut Writer<W>,
    ) -> Result<(), EncodeError> {
        if self.output.xml_declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        tokens.write_to(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderConfig;
    use crate::wsdl::{Schema, SchemaImport, Types};

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"))
        }
    }

    fn encoder() -> SoapRequestEncoder {
        SoapRequestEncoder::new(EncoderConfig::default()).with_namespace("urn:test")
    }

    #[test]
    fn test_to_xml_string() {
        let call = SoapCall::new("DoWork", Value::mapping([("x", "y")]));
        let xml = encoder().to_xml_string(&call).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
                r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" "#,
                r#"xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
                r#"<soap:Body><DoWork xmlns="urn:test"><x>y</x></DoWork></soap:Body>"#,
                r#"</soap:Envelope>"#
            )
        );
    }

    #[test]
    fn test_xml_declaration_and_indent() {
        let mut config = EncoderConfig::default();
        config.output.xml_declaration = true;
        config.output.indent = 2;
        let encoder = SoapRequestEncoder::new(config).with_namespace("urn:test");

        let xml = encoder
            .to_xml_string(&SoapCall::new("Ping", Value::pair("n", 1)))
            .unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("\n  <soap:Body>"));
        assert!(xml.contains("<n>1</n>"));
    }

    #[test]
    fn test_header_name_from_config() {
        let config = EncoderConfig {
            header: HeaderConfig {
                name: "Auth".to_string(),
            },
            ..Default::default()
        };
        let encoder = SoapRequestEncoder::new(config).with_namespace("urn:h");
        let call = SoapCall::new("Get", Value::Null).with_header(Value::pair("token", "abc"));

        let xml = encoder.to_xml_string(&call).unwrap();
        assert!(xml.contains(
            r#"<soap:Header><Auth xmlns="urn:h"><token>abc</token></Auth></soap:Header>"#
        ));
        assert!(xml.contains(r#"<Get xmlns="urn:h"></Get>"#));
    }

    #[test]
    fn test_namespace_from_definitions() {
        let definitions = Definitions {
            target_namespace: String::new(),
            types: vec![Types {
                schemas: vec![Schema {
                    target_namespace: None,
                    imports: vec![SchemaImport {
                        namespace: "urn:imported".to_string(),
                        schema_location: None,
                    }],
                }],
            }],
        };
        let encoder =
            SoapRequestEncoder::new(EncoderConfig::default()).with_definitions(definitions);
        assert_eq!(encoder.namespace().unwrap(), "urn:imported");
    }

    #[test]
    fn test_missing_definitions_fails_before_tokens() {
        let encoder = SoapRequestEncoder::new(EncoderConfig::default());
        let mut sink = Vec::new();
        let err = encoder
            .write_call(&SoapCall::new("Get", Value::Null), &mut sink)
            .unwrap_err();

        assert!(matches!(err, EncodeError::DefinitionsMissing));
        assert!(sink.is_empty());
        assert_eq!(encoder.stats().calls_failed, 1);
    }

    #[test]
    fn test_empty_method_writes_nothing() {
        let encoder = encoder();
        let mut sink = Vec::new();
        let call = SoapCall::new("", Value::mapping([("a", 1)])).with_header(Value::pair("h", 1));
        let err = encoder.write_call(&call, &mut sink).unwrap_err();

        assert_eq!(err.code(), "MISSING_METHOD_OR_NAMESPACE");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_stats() {
        let encoder = encoder();
        encoder.encode(&SoapCall::new("A", Value::Null)).unwrap();
        encoder.encode(&SoapCall::new("B", 1)).unwrap();
        let _ = encoder.encode(&SoapCall::new("", 1));

        assert_eq!(
            encoder.stats(),
            EncodeStats {
                calls_encoded: 2,
                calls_failed: 1,
            }
        );
    }

    #[test]
    fn test_writer_failure_counts_once() {
        let encoder = encoder();
        let err = encoder
            .write_call(&SoapCall::new("Get", Value::pair("id", 1)), ClosedSink)
            .unwrap_err();

        assert_eq!(err.code(), "WRITER_FAILURE");
        assert_eq!(
            encoder.stats(),
            EncodeStats {
                calls_encoded: 0,
                calls_failed: 1,
            }
        );
    }

    #[test]
    fn test_write_call_counts_success_once() {
        let encoder = encoder();
        let mut sink = Vec::new();
        encoder
            .write_call(&SoapCall::new("Get", Value::Null), &mut sink)
            .unwrap();

        assert!(!sink.is_empty());
        assert_eq!(
            encoder.stats(),
            EncodeStats {
                calls_encoded: 1,
                calls_failed: 0,
            }
        );
    }
}
