// crates/scl-dtt-xml/src/error.rs

use alloc::fmt;
use alloc::string::String;
use quick_xml::errors::serialize::DeError;
use scl_dtt::DttError;
use scl_dtt::types::ParseTypeError;

/// Errors that can occur while loading an SCL document.
#[derive(Debug)]
pub enum SclXmlError {
    /// An error from the underlying `quick-xml` deserializer.
    XmlParsing(DeError),

    /// A required XML element was missing (e.g., DataTypeTemplates).
    MissingElement { element: &'static str },

    /// An attribute held a literal outside its enumeration (e.g., @bType="FLOAT").
    InvalidAttribute { attribute: &'static str, value: String },

    /// The loaded definitions or instances were rejected by the type library.
    Library(DttError),

    /// An imported IED name is already used by the document.
    DuplicateIed { name: String },
}

impl From<DeError> for SclXmlError {
    fn from(e: DeError) -> Self {
        SclXmlError::XmlParsing(e)
    }
}

impl From<DttError> for SclXmlError {
    fn from(e: DttError) -> Self {
        SclXmlError::Library(e)
    }
}

impl From<ParseTypeError> for SclXmlError {
    fn from(e: ParseTypeError) -> Self {
        SclXmlError::InvalidAttribute {
            attribute: e.attribute,
            value: e.value,
        }
    }
}

impl fmt::Display for SclXmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SclXmlError::XmlParsing(e) => write!(f, "XML parsing error: {}", e),
            SclXmlError::MissingElement { element } => {
                write!(f, "Missing required XML element: {}", element)
            }
            SclXmlError::InvalidAttribute { attribute, value } => {
                write!(f, "Invalid value '{}' for attribute: {}", value, attribute)
            }
            SclXmlError::Library(e) => write!(f, "Type library error: {}", e),
            SclXmlError::DuplicateIed { name } => {
                write!(f, "IED '{}' already exists in the document", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SclXmlError;
    use alloc::string::ToString;
    use scl_dtt::{BasicType, DttError, TypeKind};

    #[test]
    fn test_from_de_error() {
        // An IED without its required name attribute.
        let xml_err = quick_xml::de::from_str::<crate::model::Scl>("<SCL><IED/></SCL>").unwrap_err();
        let err: SclXmlError = xml_err.into();
        assert!(matches!(err, SclXmlError::XmlParsing(_)));
    }

    #[test]
    fn test_from_parse_type_error() {
        let parse_err = "FLOAT".parse::<BasicType>().unwrap_err();
        let err: SclXmlError = parse_err.into();
        assert!(matches!(
            err,
            SclXmlError::InvalidAttribute { attribute: "bType", ref value } if value == "FLOAT"
        ));
    }

    #[test]
    fn test_from_library_error() {
        let err: SclXmlError = DttError::DuplicateTypeId {
            kind: TypeKind::DoType,
            id: "X".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Type library error: DOType 'X' is already defined"
        );
    }
}
