//! Positional extraction of result-table rows.

use scraper::{ElementRef, Html, Selector};

use crate::layout::{CellParse, ColumnSpec, Field, NameStyle};
use crate::Error;

/// A single extracted value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Int(i64),
}

/// An unvalidated row, in layout rule order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(Field, Cell)>,
}

impl RawRow {
    pub fn push(&mut self, field: Field, cell: Cell) {
        self.cells.push((field, cell));
    }

    pub fn get(&self, field: Field) -> Option<&Cell> {
        self.cells.iter().find(|(f, _)| *f == field).map(|(_, c)| c)
    }

    /// Text of `field`, or `""` when the layout has no such field.
    pub fn text(&self, field: Field) -> &str {
        match self.get(field) {
            Some(Cell::Text(s)) => s,
            _ => "",
        }
    }

    /// Integer value of `field`. Text cells go through [`parse_leading_int`];
    /// absent fields are 0.
    pub fn int(&self, field: Field) -> i64 {
        match self.get(field) {
            Some(Cell::Int(n)) => *n,
            Some(Cell::Text(s)) => parse_leading_int(s),
            None => 0,
        }
    }
}

struct CompiledRule {
    field: Field,
    column: usize,
    parse: CompiledParse,
}

enum CompiledParse {
    Text,
    LinkText,
    LinkHref,
    Integer,
    NameSpans { short: Selector, long: Selector },
}

/// Reads every row matched by `spec.row_selector` from `doc`.
///
/// Only selector compilation can fail. A row missing a referenced column, or
/// an anchor, yields empty text or 0 for that field.
pub fn extract_rows(doc: &str, spec: &ColumnSpec) -> Result<Vec<RawRow>, Error> {
    spec.validate()?;
    let row_selector = parse_selector(&spec.row_selector)?;
    let anchor = parse_selector("a")?;
    let rules = spec
        .rules
        .iter()
        .map(|rule| {
            let parse = match &rule.parse {
                CellParse::Text => CompiledParse::Text,
                CellParse::LinkText => CompiledParse::LinkText,
                CellParse::LinkHref => CompiledParse::LinkHref,
                CellParse::Integer => CompiledParse::Integer,
                CellParse::NameSpans { short, long } => CompiledParse::NameSpans {
                    short: parse_selector(short)?,
                    long: parse_selector(long)?,
                },
            };
            Ok(CompiledRule {
                field: rule.field,
                column: rule.column,
                parse,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let document = Html::parse_document(doc);
    let rows = document
        .select(&row_selector)
        .map(|row| {
            let columns: Vec<ElementRef> = row.children().filter_map(ElementRef::wrap).collect();
            let mut raw = RawRow::default();
            for rule in &rules {
                let cell = columns.get(rule.column - 1);
                raw.push(rule.field, read_cell(cell, &rule.parse, &anchor, spec.name_style));
            }
            raw
        })
        .collect();

    Ok(rows)
}

fn read_cell(
    cell: Option<&ElementRef>,
    parse: &CompiledParse,
    anchor: &Selector,
    style: NameStyle,
) -> Cell {
    let Some(cell) = cell else {
        return match parse {
            CompiledParse::Integer => Cell::Int(0),
            _ => Cell::Text(String::new()),
        };
    };

    match parse {
        CompiledParse::Text => Cell::Text(element_text(cell)),
        CompiledParse::LinkText => Cell::Text(
            cell.select(anchor)
                .next()
                .map(|a| element_text(&a))
                .unwrap_or_default(),
        ),
        CompiledParse::LinkHref => Cell::Text(
            cell.select(anchor)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| href.trim().to_string())
                .unwrap_or_default(),
        ),
        CompiledParse::Integer => Cell::Int(parse_leading_int(&element_text(cell))),
        CompiledParse::NameSpans { short, long } => {
            let short = span_text(cell, short);
            let long = span_text(cell, long);
            Cell::Text(join_name(&short, &long, style))
        }
    }
}

fn span_text(cell: &ElementRef, selector: &Selector) -> String {
    cell.select(selector)
        .map(|e| e.text().collect::<String>())
        .collect::<String>()
        .trim()
        .to_string()
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn join_name(short: &str, long: &str, style: NameStyle) -> String {
    let joined = format!("{} {}", short, long);
    match style {
        NameStyle::Preserve => joined,
        NameStyle::Normalize => joined.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

fn parse_selector(selector: &str) -> Result<Selector, Error> {
    Selector::parse(selector)
        .map_err(|e| Error::Layout(format!("invalid selector '{}': {:?}", selector, e)))
}

/// Parses the leading integer of `raw`, ignoring surrounding whitespace.
///
/// `"12"` → 12, `"4.5"` → 4, `"-3"` → -3, `"DNF"` / `""` → 0.
pub fn parse_leading_int(raw: &str) -> i64 {
    let s = raw.trim();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}
