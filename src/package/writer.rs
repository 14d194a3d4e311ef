//! Write side of the container: serializes parts to XML and packs them into
//! a ZIP archive

use super::parts::{CellPart, SheetEntry, Stylesheet, WorksheetPart};
use super::{
    CT_RELATIONSHIPS, CT_STYLES, CT_WORKBOOK, CT_WORKSHEET, NS_CONTENT_TYPES, NS_MAIN,
    NS_PACKAGE_RELATIONSHIPS, NS_RELATIONSHIPS, REL_OFFICE_DOCUMENT, REL_STYLES, REL_WORKSHEET,
};
use crate::error::SheetResult;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Parts of a workbook being created; nothing is written until [`save`]
///
/// [`save`]: WorkbookPackage::save
#[derive(Debug, Default)]
pub struct WorkbookPackage {
    sheets: Vec<(SheetEntry, WorksheetPart)>,
    styles: Option<Stylesheet>,
}

impl WorkbookPackage {
    pub fn create_for_write() -> Self {
        Self::default()
    }

    /// Add a worksheet part and its workbook entry
    pub fn add_worksheet(&mut self, name: &str, worksheet: WorksheetPart) -> &SheetEntry {
        let number = self.sheets.len() + 1;
        let entry = SheetEntry {
            name: name.to_string(),
            sheet_id: number as u32,
            rel_id: format!("rId{}", number),
            target: Some(format!("xl/worksheets/sheet{}.xml", number)),
        };
        self.sheets.push((entry, worksheet));
        &self.sheets[number - 1].0
    }

    pub fn sheets(&self) -> impl Iterator<Item = &SheetEntry> {
        self.sheets.iter().map(|(entry, _)| entry)
    }

    pub fn worksheet(&self, name: &str) -> Option<&WorksheetPart> {
        self.sheets
            .iter()
            .find(|(entry, _)| entry.name == name)
            .map(|(_, worksheet)| worksheet)
    }

    pub fn styles(&self) -> Option<&Stylesheet> {
        self.styles.as_ref()
    }

    /// Styles part, created empty on first access
    pub fn styles_mut(&mut self) -> &mut Stylesheet {
        self.styles.get_or_insert_with(Stylesheet::default)
    }

    /// Serialize every part and finalize the archive
    pub fn save<W: Write + Seek>(self, writer: W) -> SheetResult<W> {
        let mut zip = ZipWriter::new(writer);
        for (path, bytes) in self.render_parts()? {
            zip.start_file(path.as_str(), part_options())?;
            zip.write_all(&bytes)?;
        }
        Ok(zip.finish()?)
    }

    pub fn to_bytes(self) -> SheetResult<Vec<u8>> {
        Ok(self.save(Cursor::new(Vec::new()))?.into_inner())
    }

    fn render_parts(&self) -> SheetResult<Vec<(String, Vec<u8>)>> {
        let mut parts = vec![
            ("[Content_Types].xml".to_string(), self.content_types_xml()?),
            ("_rels/.rels".to_string(), root_rels_xml()?),
            ("xl/workbook.xml".to_string(), self.workbook_xml()?),
            ("xl/_rels/workbook.xml.rels".to_string(), self.workbook_rels_xml()?),
        ];
        for (entry, worksheet) in &self.sheets {
            if let Some(target) = &entry.target {
                parts.push((target.clone(), worksheet_xml(worksheet)?));
            }
        }
        if let Some(styles) = &self.styles {
            parts.push(("xl/styles.xml".to_string(), styles_xml(styles)?));
        }
        Ok(parts)
    }

    fn styles_rel_id(&self) -> String {
        format!("rId{}", self.sheets.len() + 1)
    }

    fn content_types_xml(&self) -> SheetResult<Vec<u8>> {
        let mut w = PartWriter::new()?;
        w.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
        w.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELATIONSHIPS)])?;
        w.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
        w.empty("Override", &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)])?;
        for (entry, _) in &self.sheets {
            if let Some(target) = &entry.target {
                let part_name = format!("/{}", target);
                w.empty("Override", &[("PartName", part_name.as_str()), ("ContentType", CT_WORKSHEET)])?;
            }
        }
        if self.styles.is_some() {
            w.empty("Override", &[("PartName", "/xl/styles.xml"), ("ContentType", CT_STYLES)])?;
        }
        w.end("Types")?;
        Ok(w.finish())
    }

    fn workbook_xml(&self) -> SheetResult<Vec<u8>> {
        let mut w = PartWriter::new()?;
        w.start("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;
        w.start("sheets", &[])?;
        for (entry, _) in &self.sheets {
            let sheet_id = entry.sheet_id.to_string();
            w.empty(
                "sheet",
                &[
                    ("name", entry.name.as_str()),
                    ("sheetId", sheet_id.as_str()),
                    ("r:id", entry.rel_id.as_str()),
                ],
            )?;
        }
        w.end("sheets")?;
        w.end("workbook")?;
        Ok(w.finish())
    }

    fn workbook_rels_xml(&self) -> SheetResult<Vec<u8>> {
        let mut w = PartWriter::new()?;
        w.start("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
        for (entry, _) in &self.sheets {
            if let Some(target) = &entry.target {
                // Targets are relative to the workbook part
                let relative = target.trim_start_matches("xl/");
                w.empty(
                    "Relationship",
                    &[
                        ("Id", entry.rel_id.as_str()),
                        ("Type", REL_WORKSHEET),
                        ("Target", relative),
                    ],
                )?;
            }
        }
        if self.styles.is_some() {
            let rel_id = self.styles_rel_id();
            w.empty(
                "Relationship",
                &[("Id", rel_id.as_str()), ("Type", REL_STYLES), ("Target", "styles.xml")],
            )?;
        }
        w.end("Relationships")?;
        Ok(w.finish())
    }
}

fn part_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn root_rels_xml() -> SheetResult<Vec<u8>> {
    let mut w = PartWriter::new()?;
    w.start("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    w.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_OFFICE_DOCUMENT), ("Target", "xl/workbook.xml")],
    )?;
    w.end("Relationships")?;
    Ok(w.finish())
}

fn worksheet_xml(worksheet: &WorksheetPart) -> SheetResult<Vec<u8>> {
    let mut w = PartWriter::new()?;
    w.start("worksheet", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;
    if worksheet.rows.is_empty() {
        w.empty("sheetData", &[])?;
    } else {
        w.start("sheetData", &[])?;
        for row in &worksheet.rows {
            let index = row.index.map(|i| i.to_string());
            let attrs: Vec<(&str, &str)> = index.iter().map(|i| ("r", i.as_str())).collect();
            w.start("row", &attrs)?;
            for cell in &row.cells {
                write_cell(&mut w, cell)?;
            }
            w.end("row")?;
        }
        w.end("sheetData")?;
    }
    w.end("worksheet")?;
    Ok(w.finish())
}

fn write_cell(w: &mut PartWriter, cell: &CellPart) -> SheetResult<()> {
    let mut attrs = Vec::with_capacity(2);
    if let Some(reference) = &cell.reference {
        attrs.push(("r", reference.as_str()));
    }
    if let Some(data_type) = cell.data_type {
        attrs.push(("t", data_type.as_str()));
    }

    match &cell.value {
        Some(value) => {
            w.start("c", &attrs)?;
            w.text_element("v", value)?;
            w.end("c")
        }
        None => w.empty("c", &attrs),
    }
}

fn styles_xml(styles: &Stylesheet) -> SheetResult<Vec<u8>> {
    let mut w = PartWriter::new()?;
    w.start("styleSheet", &[("xmlns", NS_MAIN)])?;

    let count = styles.fonts.len().to_string();
    w.start("fonts", &[("count", count.as_str())])?;
    for _ in &styles.fonts {
        w.empty("font", &[])?;
    }
    w.end("fonts")?;

    let count = styles.fills.len().to_string();
    w.start("fills", &[("count", count.as_str())])?;
    for fill in &styles.fills {
        w.start("fill", &[])?;
        w.empty("patternFill", &[("patternType", fill.pattern.as_str())])?;
        w.end("fill")?;
    }
    w.end("fills")?;

    let count = styles.borders.len().to_string();
    w.start("borders", &[("count", count.as_str())])?;
    for _ in &styles.borders {
        w.empty("border", &[])?;
    }
    w.end("borders")?;

    let count = styles.cell_formats.len().to_string();
    w.start("cellXfs", &[("count", count.as_str())])?;
    for format in &styles.cell_formats {
        let ids = [
            ("numFmtId", format.number_format_id),
            ("fontId", format.font_id),
            ("fillId", format.fill_id),
            ("borderId", format.border_id),
        ];
        let values: Vec<(&str, String)> = ids
            .iter()
            .filter_map(|(name, id)| id.map(|id| (*name, id.to_string())))
            .collect();
        let attrs: Vec<(&str, &str)> = values.iter().map(|(n, v)| (*n, v.as_str())).collect();
        w.empty("xf", &attrs)?;
    }
    w.end("cellXfs")?;

    w.end("styleSheet")?;
    Ok(w.finish())
}

/// Thin event writer for one XML part
struct PartWriter {
    inner: Writer<Vec<u8>>,
}

impl PartWriter {
    fn new() -> SheetResult<Self> {
        let mut inner = Writer::new(Vec::new());
        inner.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { inner })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> SheetResult<()> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.inner.write_event(Event::Start(element))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> SheetResult<()> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.inner.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> SheetResult<()> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, text: &str) -> SheetResult<()> {
        self.start(name, &[])?;
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}
