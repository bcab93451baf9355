//! SOAP 1.1 request encoder for Zentinel
//!
//! Turns dynamic parameter trees into an ordered XML token stream wrapped
//! in a SOAP envelope, then hands the stream to a quick-xml writer.
//!
//! # Features
//!
//! - Recursive value encoding (mappings, records, pairs, sequences, scalars)
//! - Canonical scalar text (decimal integers, shortest round-trip floats)
//! - Envelope/Header/Body assembly with configurable prefix and attributes
//! - Target namespace resolution from WSDL definitions
//! - All-or-nothing assembly: failed calls never reach the writer
//!
//! # Example
//!
//! ```
//! use zentinel_soap_encoder::{EncoderConfig, SoapCall, SoapRequestEncoder, Value};
//!
//! let encoder = SoapRequestEncoder::new(EncoderConfig::default())
//!     .with_namespace("urn:example:users");
//! let call = SoapCall::new("GetUser", Value::mapping([("userId", 42)]));
//!
//! let xml = encoder.to_xml_string(&call).unwrap();
//! assert!(xml.contains(r#"<GetUser xmlns="urn:example:users"><userId>42</userId></GetUser>"#));
//! ```

pub mod client;
pub mod config;
pub mod encoder;
pub mod envelope;
pub mod error;
pub mod token;
pub mod value;
pub mod wsdl;

pub use client::{SoapCall, SoapRequestEncoder};
pub use config::{EncoderConfig, EnvelopeConfig};
pub use envelope::{EncodeRequest, EnvelopeAssembler};
pub use error::EncodeError;
pub use token::{Attribute, Token, TokenSequence};
pub use value::{Record, Value};
