// HTML table import
//
// Some report exports are HTML documents saved with an `.xls` extension.
// Only the first <table> is read; its first row is the header.

use std::io::Read;
use std::path::Path;

use regex::Regex;
use tracksla_recon::Cell;

use crate::source::RawSheet;

struct Patterns {
    table: Regex,
    row_open: Regex,
    row_close: Regex,
    cell_open: Regex,
    cell_close: Regex,
    line_break: Regex,
    tag: Regex,
    whitespace: Regex,
}

impl Patterns {
    fn new() -> Result<Self, String> {
        let compile = |p: &str| Regex::new(p).map_err(|e| format!("Invalid pattern '{}': {}", p, e));
        Ok(Self {
            table: compile(r"(?is)<table\b[^>]*>(.*?)</table\s*>")?,
            row_open: compile(r"(?i)<tr\b[^>]*>")?,
            row_close: compile(r"(?i)</tr\s*>")?,
            cell_open: compile(r"(?i)<t[dh]\b[^>]*>")?,
            cell_close: compile(r"(?i)</t[dh]\s*>")?,
            line_break: compile(r"(?i)<br\s*/?>")?,
            tag: compile(r"(?s)<[^>]*>")?,
            whitespace: compile(r"\s+")?,
        })
    }
}

/// Read the first table of an HTML document as one sheet named `sheet_name`.
pub fn import(path: &Path, sheet_name: &str) -> Result<RawSheet, String> {
    let content = read_file_as_utf8(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    import_from_string(&content, sheet_name)
}

pub fn import_from_string(content: &str, sheet_name: &str) -> Result<RawSheet, String> {
    let patterns = Patterns::new()?;

    let table = patterns
        .table
        .captures(content)
        .and_then(|c| c.get(1))
        .ok_or_else(|| "No <table> element found".to_string())?
        .as_str();

    // Closing tags are optional in HTML, so split on opening tags and cut
    // each segment at its closing tag when there is one.
    let rows: Vec<Vec<Cell>> = segments(&patterns.row_open, &patterns.row_close, table)
        .map(|row| {
            segments(&patterns.cell_open, &patterns.cell_close, row)
                .map(|cell| text_cell(&patterns, cell))
                .collect::<Vec<Cell>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        return Err("HTML table has no rows".to_string());
    }

    Ok(RawSheet::from_rows(sheet_name, rows))
}

fn segments<'a>(
    open: &'a Regex,
    close: &'a Regex,
    text: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    open.split(text).skip(1).map(move |seg| match close.find(seg) {
        Some(m) => &seg[..m.start()],
        None => seg,
    })
}

fn text_cell(patterns: &Patterns, inner: &str) -> Cell {
    let text = patterns.line_break.replace_all(inner, " ");
    let text = patterns.tag.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = patterns.whitespace.replace_all(&text, " ");
    let text = text.trim();
    if text.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(text.to_string())
    }
}

/// Decode the named entities report exports use plus numeric references.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Read a file as UTF-8, falling back to Windows-1252 for legacy exports.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
