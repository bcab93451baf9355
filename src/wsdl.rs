//! WSDL definitions model and target namespace resolution.
//!
//! Only what namespace resolution needs is modelled. The reader uses
//! quick-xml, which does not expand entities; DOCTYPE and ENTITY
//! declarations are rejected up front anyway.

use crate::error::EncodeError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};

/// Service description, reduced to its namespace-relevant parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    /// `targetNamespace` of the definitions element
    pub target_namespace: String,
    /// `<types>` sections, in document order
    pub types: Vec<Types>,
}

/// One `<types>` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Types {
    pub schemas: Vec<Schema>,
}

/// An embedded `<xsd:schema>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub target_namespace: Option<String>,
    pub imports: Vec<SchemaImport>,
}

/// A schema-level `<xsd:import>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaImport {
    pub namespace: String,
    pub schema_location: Option<String>,
}

/// Resolve the namespace for the method and header wrapper elements.
///
/// With type sections present, the definitions' target namespace wins when
/// set; otherwise the first import of the first schema is used. Without any
/// type sections the target namespace is returned as is, possibly empty.
pub fn resolve_namespace(definitions: Option<&Definitions>) -> Result<String, EncodeError> {
    let definitions = definitions.ok_or(EncodeError::DefinitionsMissing)?;

    let Some(types) = definitions.types.first() else {
        return Ok(definitions.target_namespace.clone());
    };

    if !definitions.target_namespace.is_empty() {
        return Ok(definitions.target_namespace.clone());
    }

    let imported = types
        .schemas
        .first()
        .and_then(|schema| schema.imports.first())
        .map(|import| import.namespace.clone())
        .unwrap_or_default();

    Ok(imported)
}

/// Parse a WSDL document into [`Definitions`].
pub fn parse_definitions(xml: &str) -> Result<Definitions, EncodeError> {
    check_entity_declarations(xml)?;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut definitions = Definitions::default();
    let mut found_definitions = false;
    let mut in_types = false;
    let mut in_schema = false;

    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            debug!(position = reader.buffer_position(), error = %e, "WSDL read failed");
            EncodeError::Xml(e)
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let local_name = local_name_str(e);

                if !found_definitions {
                    if local_name != "definitions" {
                        return Err(EncodeError::WsdlParse(format!(
                            "expected <definitions> root element, found <{}>",
                            local_name
                        )));
                    }
                    found_definitions = true;
                    definitions.target_namespace =
                        attribute_value(e, "targetNamespace")?.unwrap_or_default();
                    if is_empty {
                        break;
                    }
                } else if !in_types && local_name == "types" {
                    definitions.types.push(Types::default());
                    in_types = !is_empty;
                } else if in_types && !in_schema && local_name == "schema" {
                    let schema = Schema {
                        target_namespace: attribute_value(e, "targetNamespace")?,
                        imports: Vec::new(),
                    };
                    trace!(target_namespace = ?schema.target_namespace, "WSDL schema found");
                    if let Some(types) = definitions.types.last_mut() {
                        types.schemas.push(schema);
                    }
                    in_schema = !is_empty;
                } else if in_schema && local_name == "import" {
                    let import = SchemaImport {
                        namespace: attribute_value(e, "namespace")?.unwrap_or_default(),
                        schema_location: attribute_value(e, "schemaLocation")?,
                    };
                    trace!(namespace = %import.namespace, "WSDL schema import found");
                    if let Some(schema) = definitions
                        .types
                        .last_mut()
                        .and_then(|types| types.schemas.last_mut())
                    {
                        schema.imports.push(import);
                    }
                }
            }

            Event::End(ref e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"schema" if in_schema => in_schema = false,
                    b"types" if in_types => in_types = false,
                    _ => {}
                }
            }

            Event::Eof => break,

            _ => {}
        }

        buf.clear();
    }

    if !found_definitions {
        return Err(EncodeError::WsdlParse(
            "no <definitions> element found".to_string(),
        ));
    }

    debug!(
        target_namespace = %definitions.target_namespace,
        types = definitions.types.len(),
        "WSDL definitions parsed"
    );

    Ok(definitions)
}

fn check_entity_declarations(xml: &str) -> Result<(), EncodeError> {
    if xml.contains("<!DOCTYPE") || xml.contains("<!doctype") {
        return Err(EncodeError::WsdlParse(
            "DOCTYPE declarations are not allowed".to_string(),
        ));
    }

    if xml.contains("<!ENTITY") || xml.contains("<!entity") {
        return Err(EncodeError::WsdlParse(
            "Entity declarations are not allowed".to_string(),
        ));
    }

    Ok(())
}

fn local_name_str(e: &BytesStart) -> String {
    let name = e.local_name();
    std::str::from_utf8(name.as_ref())
        .unwrap_or("")
        .to_string()
}

/// Unescaped value of the first attribute whose local name is `key`.
///
/// Values are stored unescaped; the token writer escapes them again on
/// output.
fn attribute_value(e: &BytesStart, key: &str) -> Result<Option<String>, EncodeError> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOCK_WSDL: &str = r#"<?xml version="1.0"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                  targetNamespace="http://example.org/stock">
  <wsdl:types>
    <xsd:schema targetNamespace="http://example.org/stock/types">
      <xsd:import namespace="http://example.org/common" schemaLocation="common.xsd"/>
      <xsd:element name="GetPrice"/>
    </xsd:schema>
  </wsdl:types>
  <wsdl:message name="GetPriceRequest"/>
</wsdl:definitions>"#;

    const IMPORT_ONLY_WSDL: &str = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/">
  <types>
    <schema xmlns="http://www.w3.org/2001/XMLSchema">
      <import namespace="urn:imported"/>
      <import namespace="urn:second"/>
    </schema>
  </types>
</definitions>"#;

    fn definitions(target: &str, types: Vec<Types>) -> Definitions {
        Definitions {
            target_namespace: target.to_string(),
            types,
        }
    }

    fn schema_with_imports(namespaces: &[&str]) -> Schema {
        Schema {
            target_namespace: None,
            imports: namespaces
                .iter()
                .map(|ns| SchemaImport {
                    namespace: ns.to_string(),
                    schema_location: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_resolve_missing_definitions() {
        let err = resolve_namespace(None).unwrap_err();
        assert!(matches!(err, EncodeError::DefinitionsMissing));
    }

    #[test]
    fn test_resolve_prefers_target_namespace() {
        let defs = definitions(
            "urn:target",
            vec![Types {
                schemas: vec![schema_with_imports(&["urn:imported"])],
            }],
        );
        assert_eq!(resolve_namespace(Some(&defs)).unwrap(), "urn:target");
    }

    #[test]
    fn test_resolve_falls_back_to_first_import() {
        let defs = definitions(
            "",
            vec![Types {
                schemas: vec![schema_with_imports(&["urn:imported", "urn:other"])],
            }],
        );
        assert_eq!(resolve_namespace(Some(&defs)).unwrap(), "urn:imported");
    }

    #[test]
    fn test_resolve_types_without_imports_is_empty() {
        let defs = definitions(
            "",
            vec![Types {
                schemas: vec![schema_with_imports(&[])],
            }],
        );
        assert_eq!(resolve_namespace(Some(&defs)).unwrap(), "");

        let no_schema = definitions("", vec![Types::default()]);
        assert_eq!(resolve_namespace(Some(&no_schema)).unwrap(), "");
    }

    #[test]
    fn test_resolve_without_types_uses_target() {
        let defs = definitions("urn:only-target", Vec::new());
        assert_eq!(resolve_namespace(Some(&defs)).unwrap(), "urn:only-target");

        let empty = Definitions::default();
        assert_eq!(resolve_namespace(Some(&empty)).unwrap(), "");
    }

    #[test]
    fn test_parse_stock_wsdl() {
        let defs = parse_definitions(STOCK_WSDL).unwrap();
        assert_eq!(defs.target_namespace, "http://example.org/stock");
        assert_eq!(defs.types.len(), 1);

        let schema = &defs.types[0].schemas[0];
        assert_eq!(
            schema.target_namespace.as_deref(),
            Some("http://example.org/stock/types")
        );
        assert_eq!(schema.imports.len(), 1);
        assert_eq!(schema.imports[0].namespace, "http://example.org/common");
        assert_eq!(schema.imports[0].schema_location.as_deref(), Some("common.xsd"));

        assert_eq!(
            resolve_namespace(Some(&defs)).unwrap(),
            "http://example.org/stock"
        );
    }

    #[test]
    fn test_parse_import_only_wsdl() {
        let defs = parse_definitions(IMPORT_ONLY_WSDL).unwrap();
        assert!(defs.target_namespace.is_empty());
        assert_eq!(defs.types[0].schemas[0].imports.len(), 2);
        assert_eq!(resolve_namespace(Some(&defs)).unwrap(), "urn:imported");
    }

    #[test]
    fn test_parse_rejects_doctype() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<definitions targetNamespace="&xxe;"/>"#;
        let err = parse_definitions(xml).unwrap_err();
        assert!(matches!(err, EncodeError::WsdlParse(_)));
    }

    #[test]
    fn test_parse_unescapes_attribute_values() {
        let xml = r#"<definitions targetNamespace="urn:a&amp;b">
  <types>
    <schema>
      <import namespace="urn:c&lt;d&gt;" schemaLocation="x.xsd?a=1&amp;b=2"/>
    </schema>
  </types>
</definitions>"#;
        let defs = parse_definitions(xml).unwrap();
        assert_eq!(defs.target_namespace, "urn:a&b");

        let import = &defs.types[0].schemas[0].imports[0];
        assert_eq!(import.namespace, "urn:c<d>");
        assert_eq!(import.schema_location.as_deref(), Some("x.xsd?a=1&b=2"));
        assert_eq!(resolve_namespace(Some(&defs)).unwrap(), "urn:a&b");
    }

    #[test]
    fn test_parse_malformed_xml_is_xml_error() {
        let err = parse_definitions("<definitions><types></definitions>").unwrap_err();
        assert!(matches!(err, EncodeError::Xml(_)));
        assert_eq!(err.code(), "XML");

        let err = parse_definitions(r#"<definitions targetNamespace="urn:&bogus;"/>"#).unwrap_err();
        assert_eq!(err.code(), "XML");
    }

    #[test]
    fn test_parse_rejects_wrong_root() {
        let err = parse_definitions("<Envelope/>").unwrap_err();
        assert!(err.to_string().contains("definitions"));

        let err = parse_definitions("").unwrap_err();
        assert!(matches!(err, EncodeError::WsdlParse(_)));
    }
}
