//! Read side of the container: opens a ZIP archive, follows relationships
//! and parses the workbook, shared strings and worksheet parts

use super::parts::{CellDataType, CellPart, RowPart, SheetEntry, WorkbookPart, WorksheetPart};
use crate::error::SheetResult;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Read, Seek};
use tracing::{debug, trace};
use zip::result::ZipError;
use zip::ZipArchive;

const DEFAULT_WORKBOOK_PATH: &str = "xl/workbook.xml";
const DEFAULT_SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// An existing spreadsheet document opened for reading
///
/// The workbook part and the shared-string table are loaded eagerly;
/// worksheet parts are parsed on demand.
pub struct SpreadsheetDocument<R: Read + Seek> {
    archive: ZipArchive<R>,
    workbook: Option<WorkbookPart>,
    shared_strings: Vec<String>,
}

impl<R: Read + Seek> SpreadsheetDocument<R> {
    /// Open a document from any seekable stream
    ///
    /// Fails when the stream is not a ZIP archive or a part is not
    /// well-formed XML. A document without a workbook part opens fine and
    /// reports `None` from [`workbook`](Self::workbook).
    pub fn open_for_read(reader: R) -> SheetResult<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let workbook_path = office_document_path(&mut archive)?;
        let Some(workbook_xml) = read_part(&mut archive, &workbook_path)? else {
            debug!(part = %workbook_path, "document has no workbook part");
            return Ok(Self {
                archive,
                workbook: None,
                shared_strings: Vec::new(),
            });
        };

        let relationships = match read_part(&mut archive, &rels_path_for(&workbook_path))? {
            Some(xml) => parse_relationships(&xml)?,
            None => Vec::new(),
        };
        let base = parent_dir(&workbook_path);

        let mut workbook = parse_workbook(&workbook_xml)?;
        for sheet in &mut workbook.sheets {
            sheet.target = relationships
                .iter()
                .find(|rel| rel.id == sheet.rel_id && rel.is_type("worksheet"))
                .map(|rel| resolve_target(base, &rel.target));
        }

        let shared_path = relationships
            .iter()
            .find(|rel| rel.is_type("sharedStrings"))
            .map(|rel| resolve_target(base, &rel.target))
            .unwrap_or_else(|| DEFAULT_SHARED_STRINGS_PATH.to_string());
        let shared_strings = match read_part(&mut archive, &shared_path)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        debug!(
            sheets = workbook.sheets.len(),
            shared_strings = shared_strings.len(),
            "opened spreadsheet document"
        );

        Ok(Self {
            archive,
            workbook: Some(workbook),
            shared_strings,
        })
    }

    pub fn workbook(&self) -> Option<&WorkbookPart> {
        self.workbook.as_ref()
    }

    pub fn shared_strings(&self) -> &[String] {
        &self.shared_strings
    }

    /// Parse the worksheet part behind a workbook entry
    ///
    /// Returns `None` when the entry's relationship does not resolve or the
    /// part is absent from the archive.
    pub fn worksheet(&mut self, sheet: &SheetEntry) -> SheetResult<Option<WorksheetPart>> {
        let Some(target) = &sheet.target else {
            trace!(sheet = %sheet.name, "sheet has no worksheet relationship");
            return Ok(None);
        };
        match read_part(&mut self.archive, target)? {
            Some(xml) => Ok(Some(parse_worksheet(&xml)?)),
            None => Ok(None),
        }
    }
}

//==============================================================================
// Archive access
//==============================================================================

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> SheetResult<Option<String>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

fn office_document_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> SheetResult<String> {
    let Some(xml) = read_part(archive, "_rels/.rels")? else {
        return Ok(DEFAULT_WORKBOOK_PATH.to_string());
    };
    Ok(parse_relationships(&xml)?
        .iter()
        .find(|rel| rel.is_type("officeDocument"))
        .map(|rel| resolve_target("", &rel.target))
        .unwrap_or_else(|| DEFAULT_WORKBOOK_PATH.to_string()))
}

/// `xl/workbook.xml` -> `xl/_rels/workbook.xml.rels`
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn parent_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the directory of its source part
fn resolve_target(base: &str, target: &str) -> String {
    let (mut segments, target) = match target.strip_prefix('/') {
        Some(absolute) => (Vec::new(), absolute),
        None => (
            base.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>(),
            target,
        ),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

//==============================================================================
// Part parsers
//==============================================================================

struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

impl Relationship {
    /// Match on the last path segment so transitional and strict
    /// namespaces are both accepted
    fn is_type(&self, kind: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(kind)
    }
}

fn xml_reader(xml: &str) -> Reader<&[u8]> {
    Reader::from_str(xml.trim_start_matches('\u{feff}'))
}

fn parse_relationships(xml: &str) -> SheetResult<Vec<Relationship>> {
    let mut reader = xml_reader(xml);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                };
                let mut external = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = attr.unescape_value()?;
                    match attr.key.local_name().as_ref() {
                        b"Id" => rel.id = value.into_owned(),
                        b"Type" => rel.rel_type = value.into_owned(),
                        b"Target" => rel.target = value.into_owned(),
                        b"TargetMode" => external = value == "External",
                        _ => {}
                    }
                }
                if !external {
                    relationships.push(rel);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}

fn parse_workbook(xml: &str) -> SheetResult<WorkbookPart> {
    let mut reader = xml_reader(xml);
    let mut workbook = WorkbookPart::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let mut entry = SheetEntry {
                    name: String::new(),
                    sheet_id: 0,
                    rel_id: String::new(),
                    target: None,
                };
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = attr.unescape_value()?;
                    match attr.key.local_name().as_ref() {
                        b"name" => entry.name = value.into_owned(),
                        b"sheetId" => entry.sheet_id = value.trim().parse().unwrap_or(0),
                        b"id" => entry.rel_id = value.into_owned(),
                        _ => {}
                    }
                }
                workbook.sheets.push(entry);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(workbook)
}

/// One string per `<si>`; rich-text runs are concatenated and phonetic
/// hints are dropped
fn parse_shared_strings(xml: &str) -> SheetResult<Vec<String>> {
    let mut reader = xml_reader(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_item = false;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => {
                    in_item = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_item && !in_phonetic => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => current.push_str(&t.unescape()?),
            Event::CData(c) if in_text => current.push_str(&String::from_utf8_lossy(&c)),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    in_item = false;
                    strings.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

fn parse_worksheet(xml: &str) -> SheetResult<WorksheetPart> {
    let mut reader = xml_reader(xml);
    let mut worksheet = WorksheetPart::default();
    let mut row: Option<RowPart> = None;
    let mut cell: Option<CellPart> = None;
    let mut capturing = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row = Some(parse_row(&e)?),
                b"c" => cell = Some(parse_cell(&e)?),
                b"rPh" => in_phonetic = true,
                b"v" | b"t" if !in_phonetic => {
                    if let Some(cell) = cell.as_mut() {
                        cell.value.get_or_insert_with(String::new);
                        capturing = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => worksheet.rows.push(parse_row(&e)?),
                b"c" => {
                    let parsed = parse_cell(&e)?;
                    if let Some(row) = row.as_mut() {
                        row.cells.push(parsed);
                    }
                }
                _ => {}
            },
            Event::Text(t) if capturing => {
                if let Some(value) = cell.as_mut().and_then(|c| c.value.as_mut()) {
                    value.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) if capturing => {
                if let Some(value) = cell.as_mut().and_then(|c| c.value.as_mut()) {
                    value.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => capturing = false,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let (Some(done), Some(row)) = (cell.take(), row.as_mut()) {
                        row.cells.push(done);
                    }
                }
                b"row" => {
                    if let Some(done) = row.take() {
                        worksheet.rows.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(worksheet)
}

fn parse_row(e: &BytesStart) -> SheetResult<RowPart> {
    let mut row = RowPart::default();
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"r" {
            row.index = attr.unescape_value()?.trim().parse().ok();
        }
    }
    Ok(row)
}

fn parse_cell(e: &BytesStart) -> SheetResult<CellPart> {
    let mut cell = CellPart::default();
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.local_name().as_ref() {
            b"r" => cell.reference = Some(attr.unescape_value()?.into_owned()),
            b"t" => cell.data_type = CellDataType::parse(&attr.unescape_value()?),
            _ => {}
        }
    }
    Ok(cell)
}
