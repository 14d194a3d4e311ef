//! In-memory model of the document parts this crate reads and writes

/// One `<sheet>` entry of the workbook part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub sheet_id: u32,
    /// Relationship id linking the entry to its worksheet part
    pub rel_id: String,
    /// Archive path of the worksheet part, when the relationship resolves
    pub target: Option<String>,
}

/// Workbook part: the ordered list of sheets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookPart {
    pub sheets: Vec<SheetEntry>,
}

/// Value of a cell's `t` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDataType {
    Boolean,
    Number,
    Error,
    SharedString,
    String,
    InlineString,
    Date,
}

impl CellDataType {
    pub fn as_str(self) -> &'static str {
        match self {
            CellDataType::Boolean => "b",
            CellDataType::Number => "n",
            CellDataType::Error => "e",
            CellDataType::SharedString => "s",
            CellDataType::String => "str",
            CellDataType::InlineString => "inlineStr",
            CellDataType::Date => "d",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "b" => Some(CellDataType::Boolean),
            "n" => Some(CellDataType::Number),
            "e" => Some(CellDataType::Error),
            "s" => Some(CellDataType::SharedString),
            "str" => Some(CellDataType::String),
            "inlineStr" => Some(CellDataType::InlineString),
            "d" => Some(CellDataType::Date),
            _ => None,
        }
    }
}

/// A `<c>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellPart {
    pub reference: Option<String>,
    pub data_type: Option<CellDataType>,
    /// Content of `<v>`, or the text of `<is>` for inline strings
    pub value: Option<String>,
}

/// A `<row>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowPart {
    /// One-based row index (`r` attribute)
    pub index: Option<u32>,
    pub cells: Vec<CellPart>,
}

/// Worksheet part: the rows of `<sheetData>`, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorksheetPart {
    pub rows: Vec<RowPart>,
}

//==============================================================================
// Styles
//==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Font;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    None,
    Gray125,
}

impl PatternType {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::None => "none",
            PatternType::Gray125 => "gray125",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub pattern: PatternType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Border;

/// An `<xf>` entry of `<cellXfs>`; unset ids are omitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFormat {
    pub number_format_id: Option<u32>,
    pub font_id: Option<u32>,
    pub fill_id: Option<u32>,
    pub border_id: Option<u32>,
}

/// Styles part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub fonts: Vec<Font>,
    pub fills: Vec<Fill>,
    pub borders: Vec<Border>,
    pub cell_formats: Vec<CellFormat>,
}

