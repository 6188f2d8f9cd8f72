//! Minimal PDF 1.4 writer for tabular reports.
//!
//! Layout is fixed: A4 portrait, built-in Helvetica fonts (no embedding),
//! a bold title on the first page, the header row repeated on every page
//! and a page footer. Output is deterministic for the same input.

use crate::OakhurstError;
use std::fmt::Write as _;

/// A4 width in points.
pub const PAGE_WIDTH: u32 = 595;
/// A4 height in points.
pub const PAGE_HEIGHT: u32 = 842;

const MARGIN: u32 = 40;
const TITLE_SIZE: u32 = 14;
const CELL_SIZE: u32 = 9;
const ROW_HEIGHT: u32 = 16;
const TITLE_BASELINE: u32 = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
const FIRST_TABLE_TOP: u32 = TITLE_BASELINE - 2 * ROW_HEIGHT;
const TABLE_TOP: u32 = PAGE_HEIGHT - MARGIN - ROW_HEIGHT;
const TABLE_BOTTOM: u32 = MARGIN + 2 * ROW_HEIGHT;
const FOOTER_BASELINE: u32 = MARGIN;

/// Data rows that fit below a header row starting at `top`.
const fn rows_below(top: u32) -> usize {
    ((top - TABLE_BOTTOM) / ROW_HEIGHT) as usize
}

/// Render `rows` under `headers` as a multi-page PDF document.
///
/// Every row must have as many cells as there are headers. Characters
/// outside printable ASCII are replaced with `?`.
pub fn table_pdf(
    title: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, OakhurstError> {
    if headers.is_empty() {
        return Err(OakhurstError::Export("table has no columns".into()));
    }
    if let Some(bad) = rows.iter().position(|r| r.len() != headers.len()) {
        return Err(OakhurstError::Export(format!(
            "row {} has {} cells, expected {}",
            bad + 1,
            rows[bad].len(),
            headers.len()
        )));
    }

    let pages = split_pages(rows);
    let page_count = pages.len();
    let column_width = (PAGE_WIDTH - 2 * MARGIN) / u32::try_from(headers.len()).unwrap_or(u32::MAX);
    let max_chars = (column_width * 2 / CELL_SIZE).saturating_sub(1).max(1) as usize;

    let mut streams = Vec::with_capacity(page_count);
    for (index, page_rows) in pages.iter().enumerate() {
        let mut content = String::new();
        let mut top = TABLE_TOP;
        if index == 0 {
            text(&mut content, "F2", TITLE_SIZE, MARGIN, TITLE_BASELINE, title);
            top = FIRST_TABLE_TOP;
        }

        let header_cells: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
        row(&mut content, "F2", top, column_width, max_chars, &header_cells);
        let rule = top - ROW_HEIGHT / 2 + 2;
        let _ = writeln!(
            content,
            "0.5 w {MARGIN} {rule} m {} {rule} l S",
            PAGE_WIDTH - MARGIN
        );

        let mut baseline = top;
        for cells in *page_rows {
            baseline -= ROW_HEIGHT;
            row(&mut content, "F1", baseline, column_width, max_chars, cells);
        }

        let footer = format!("Page {} of {page_count}", index + 1);
        text(&mut content, "F1", CELL_SIZE, MARGIN, FOOTER_BASELINE, &footer);
        streams.push(content);
    }

    Ok(assemble(&streams))
}

/// Split rows into pages; an empty table still gets one page.
fn split_pages(rows: &[Vec<String>]) -> Vec<&[Vec<String>]> {
    let first = rows_below(FIRST_TABLE_TOP).min(rows.len());
    let mut pages = vec![&rows[..first]];
    let rest = &rows[first..];
    pages.extend(rest.chunks(rows_below(TABLE_TOP)));
    pages
}

fn row(
    content: &mut String,
    font: &str,
    baseline: u32,
    column_width: u32,
    max_chars: usize,
    cells: &[String],
) {
    let mut x = MARGIN;
    for cell in cells {
        text(content, font, CELL_SIZE, x, baseline, &fit(cell, max_chars));
        x += column_width;
    }
}

fn text(content: &mut String, font: &str, size: u32, x: u32, y: u32, value: &str) {
    let _ = writeln!(
        content,
        "BT /{font} {size} Tf {x} {y} Td ({}) Tj ET",
        escape(value)
    );
}

/// Truncate to `max_chars`, marking the cut with `~`.
fn fit(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

/// Escape a PDF literal string.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => out.push('?'),
        }
    }
    out
}

// =============================================================================
// FILE ASSEMBLY
// =============================================================================

/// Lay out objects and the cross-reference table.
///
/// Objects: 1 catalog, 2 page tree, 3 regular font, 4 bold font, then a
/// page object and its content stream for every page.
fn assemble(streams: &[String]) -> Vec<u8> {
    let page_ids: Vec<usize> = (0..streams.len()).map(|i| 5 + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", streams.len()),
        font_object("Helvetica"),
        font_object("Helvetica-Bold"),
    ];
    for (stream, page_id) in streams.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            page_id + 1
        ));
        // The EOL before `endstream` is not part of the stream data.
        let data = stream.trim_end_matches('\n');
        objects.push(format!(
            "<< /Length {} >>\nstream\n{data}\nendstream",
            data.len()
        ));
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
    }

    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in &offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

fn font_object(base: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
}

// =============================================================================
// TESTS
// =============================================================================
