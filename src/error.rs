use crate::types::ValueType;
use thiserror::Error;

pub type SheetResult<T> = Result<T, SheetError>;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML escape error: {0}")]
    XmlEscape(#[from] quick_xml::escape::EscapeError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("Malformed container: {0}")]
    Container(String),

    #[error("Schema configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Record has no field '{0}'")]
    UnknownField(String),

    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: String },

    #[error("Row has {actual} cells, expected {expected}")]
    RaggedRow { expected: usize, actual: usize },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// A cell's text could not be turned into a field's value.
///
/// Raised by the value codec and by [`FieldValue`](crate::FieldValue)
/// conversions. The import path swallows it per field.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert {value:?} to {target}: {reason}")]
pub struct ConversionError {
    pub value: String,
    pub target: ValueType,
    pub reason: String,
}

impl ConversionError {
    pub fn new(value: impl Into<String>, target: ValueType, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            target,
            reason: reason.into(),
        }
    }
}
