//! The parts of a page that price scanning needs: tables, their rows and the
//! `td` cells of each row.
//!
//! Text follows `textContent`: a table's text includes the text of nested
//! tables, and every `tr` inside a table (nested or not) counts as one of its
//! rows. Likewise a row's cells are all `td` elements beneath it.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));

fn selector(css: &str) -> Selector {
    // only called with the constant tag names above
    Selector::parse(css).expect("tag selector is valid")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub text: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub text: String,
    rows: Vec<Row>,
}

impl Table {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// Owned snapshot of a parsed page, detached from the DOM so it can be sent
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tables: Vec<Table>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let page = Html::parse_document(html);
        let tables = page.select(&TABLE).map(read_table).collect();
        Document { tables }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

fn read_table(table: ElementRef<'_>) -> Table {
    Table {
        text: text_of(table),
        rows: table.select(&ROW).map(read_row).collect(),
    }
}

fn read_row(row: ElementRef<'_>) -> Row {
    Row {
        text: text_of(row),
        cells: row.select(&CELL).map(text_of).collect(),
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}
