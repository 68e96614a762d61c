use crate::domain::model::{Cell, ResultTable};
use crate::utils::error::{Result, ScrapeError};
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::ProcessingError {
        message: format!("Invalid selector '{}': {}", css, e),
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<Vec<_>>().join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn in_thead(row: &ElementRef<'_>) -> bool {
    row.parent()
        .and_then(|p| p.value().as_element().map(|e| e.name() == "thead"))
        .unwrap_or(false)
}

/// Parses the first `<table>` in `html` into a grid.
///
/// The header is the first `<thead>` row, or else a leading row made only of
/// `<th>` cells. Header text is trimmed but otherwise kept as rendered; data
/// cells have whitespace runs collapsed. Without a header, columns are named
/// `Column 1`, `Column 2`, and so on.
pub fn parse_table(html: &str) -> Result<ResultTable> {
    let fragment = Html::parse_fragment(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;
    let td_sel = selector("td")?;

    let table = fragment
        .select(&table_sel)
        .next()
        .ok_or_else(|| ScrapeError::ProcessingError {
            message: "No <table> element in results markup".to_string(),
        })?;

    let mut header: Option<Vec<String>> = None;
    let mut body: Vec<Vec<String>> = Vec::new();

    for row in table.select(&row_sel) {
        let head_row = in_thead(&row);
        let cells = row.select(&cell_sel).map(cell_text);

        if header.is_none() && body.is_empty() && (head_row || row.select(&td_sel).next().is_none())
        {
            header = Some(cells.map(|t| t.trim().to_string()).collect());
            continue;
        }
        if head_row {
            continue;
        }

        let values: Vec<String> = cells.map(|t| collapse_whitespace(&t)).collect();
        if !values.is_empty() {
            body.push(values);
        }
    }

    let columns = header.unwrap_or_else(|| {
        let width = body.iter().map(Vec::len).max().unwrap_or(0);
        (1..=width).map(|i| format!("Column {}", i)).collect()
    });

    let mut result = ResultTable::new(columns);
    for values in body {
        if values.len() > result.columns().len() {
            tracing::debug!(
                "Row has {} cells for {} columns, extra cells dropped",
                values.len(),
                result.columns().len()
            );
        }
        result.push_row(values.into_iter().map(Cell::text).collect());
    }
    Ok(result)
}
