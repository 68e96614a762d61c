use crate::config::toml_config::OutputConfig;
use crate::domain::model::{Cell, ResultTable};

/// Collapses whitespace runs in a header name: `"SubCont  Value"` becomes
/// `"SubCont Value"`.
pub fn normalize_header(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses an amount such as `"$12,345.00"`. Accounting negatives like
/// `"($1,200.00)"` are read as negative numbers.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let digits: String = body
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    let unsigned = digits.strip_prefix('-').unwrap_or(digits.as_str());
    if !unsigned.bytes().any(|b| b.is_ascii_digit())
        || !unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        || unsigned.matches('.').count() > 1
    {
        return None;
    }

    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Normalizes headers and turns the configured amount columns into numbers.
/// Returns how many cells could not be parsed; those keep their text.
pub fn clean_table(table: &mut ResultTable, config: &OutputConfig) -> usize {
    if config.normalize_headers {
        table.rename_columns(normalize_header);
    }

    let mut unparsed = 0;
    for wanted in &config.currency_columns {
        let wanted_name = normalize_header(wanted);
        let Some(idx) = table
            .columns()
            .iter()
            .position(|c| normalize_header(c) == wanted_name)
        else {
            continue;
        };
        for cell in table.column_cells_mut(idx) {
            let Cell::Text(raw) = cell else {
                continue;
            };
            match parse_currency(raw) {
                Some(value) => *cell = Cell::Number(value),
                None => {
                    tracing::warn!("Could not read '{}' in column '{}' as an amount", raw, wanted);
                    unparsed += 1;
                }
            }
        }
    }
    unparsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$12,345.00"), Some(12345.00));
        assert_eq!(parse_currency("$12345.00"), Some(12345.00));
        assert_eq!(parse_currency("12,345"), Some(12345.0));
        assert_eq!(parse_currency(" $1,234,567.89 "), Some(1234567.89));
        assert_eq!(parse_currency("($1,200.50)"), Some(-1200.50));
        assert_eq!(parse_currency("$0.00"), Some(0.0));
        assert_eq!(parse_currency("$"), None);
        assert_eq!(parse_currency("N/A"), None);
        assert_eq!(parse_currency("-$50.00"), Some(-50.0));
        assert_eq!(parse_currency("$.5"), Some(0.5));
        assert_eq!(parse_currency("NaN"), None);
        assert_eq!(parse_currency("inf"), None);
        assert_eq!(parse_currency("$1e3"), None);
        assert_eq!(parse_currency("1.2.3"), None);
        assert_eq!(parse_currency("--5"), None);
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("SubCont  Value"), "SubCont Value");
        assert_eq!(normalize_header(" Orig.\tContract\n Amt "), "Orig. Contract Amt");
        assert_eq!(normalize_header("Project Number"), "Project Number");
    }

    #[test]
    fn test_clean_table() {
        let mut table = ResultTable::new(vec![
            "Sub Contractor".to_string(),
            "SubCont  Value".to_string(),
            "Orig. Contract Amt".to_string(),
        ]);
        table.push_row(vec![
            Cell::text("Acme"),
            Cell::text("$12,345.00"),
            Cell::text("$1,000,000.00"),
        ]);
        table.push_row(vec![Cell::text("Beta"), Cell::text("pending"), Cell::Empty]);

        let unparsed = clean_table(&mut table, &OutputConfig::default());

        assert_eq!(unparsed, 1);
        assert_eq!(
            table.columns(),
            &["Sub Contractor", "SubCont Value", "Orig. Contract Amt"]
        );
        assert_eq!(table.rows()[0][1], Cell::Number(12345.0));
        assert_eq!(table.rows()[0][2], Cell::Number(1_000_000.0));
        assert_eq!(table.rows()[1][1], Cell::text("pending"));
        assert_eq!(table.rows()[1][2], Cell::Empty);
    }

    #[test]
    fn test_clean_table_without_header_normalization() {
        let mut table = ResultTable::new(vec!["SubCont  Value".to_string()]);
        table.push_row(vec![Cell::text("$5")]);

        let config = OutputConfig {
            normalize_headers: false,
            ..OutputConfig::default()
        };
        clean_table(&mut table, &config);

        assert_eq!(table.columns(), &["SubCont  Value"]);
        assert_eq!(table.rows()[0][0], Cell::Number(5.0));
    }
}
