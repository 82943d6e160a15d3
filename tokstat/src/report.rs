use std::cmp::Ordering;

use crate::api::AnalysisData;
use crate::ClientConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub key: String,
    pub value: f64,
}

impl Row {
    fn new(key: &str, value: f64) -> Self {
        Self {
            key: key.to_string(),
            value,
        }
    }

    /// Whole numbers print without a fractional part (`9`, not `9.0`).
    pub fn display_value(&self) -> String {
        format!("{}", self.value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub title: String,
    pub key_header: &'static str,
    pub value_header: &'static str,
    pub rows: Vec<Row>,
}

/// Largest `n` entries by value. Equal values keep the order they arrived in.
pub fn top_n(entries: &[(String, f64)], n: usize) -> Vec<Row> {
    let mut ranked: Vec<&(String, f64)> = entries.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
        .into_iter()
        .take(n)
        .map(|(key, value)| Row::new(key, *value))
        .collect()
}

pub fn in_order(entries: &[(String, f64)]) -> Vec<Row> {
    entries
        .iter()
        .map(|(key, value)| Row::new(key, *value))
        .collect()
}

/// Everything shown for one successfully analyzed file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileReport {
    pub filename: String,
    pub top_by_orders: Table,
    pub top_by_quantity: Table,
    pub entries_per_hour: Table,
    pub quantity_per_hour: Table,
    pub export_href: String,
}

impl FileReport {
    pub fn from_analysis(filename: &str, data: &AnalysisData, config: &ClientConfig) -> Self {
        let n = config.top_n;
        Self {
            filename: filename.to_string(),
            top_by_orders: Table {
                title: format!("Top {n} Tokens by Number of Orders"),
                key_header: "Token",
                value_header: "Orders",
                rows: top_n(&data.token_counts, n),
            },
            top_by_quantity: Table {
                title: format!("Top {n} Tokens by Total Quantity"),
                key_header: "Token",
                value_header: "Quantity",
                rows: top_n(&data.quantity_per_token, n),
            },
            entries_per_hour: Table {
                title: "Number of Entries per Hour".to_string(),
                key_header: "Hour",
                value_header: "Entries",
                rows: in_order(&data.entries_per_hour),
            },
            quantity_per_hour: Table {
                title: "Total Order Quantity per Hour".to_string(),
                key_header: "Hour",
                value_header: "Quantity",
                rows: in_order(&data.quantity_per_hour),
            },
            export_href: config.export_url(filename),
        }
    }

    pub fn tables(&self) -> [&Table; 4] {
        [
            &self.top_by_orders,
            &self.top_by_quantity,
            &self.entries_per_hour,
            &self.quantity_per_hour,
        ]
    }
}

/// One appended fragment in the results area.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderBlock {
    Report(FileReport),
    Failed { filename: String, message: String },
}

impl RenderBlock {
    pub fn filename(&self) -> &str {
        match self {
            RenderBlock::Report(report) => &report.filename,
            RenderBlock::Failed { filename, .. } => filename,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RenderBlock::Failed { .. })
    }

    /// Flattened visible text, heading first.
    pub fn text(&self) -> String {
        match self {
            RenderBlock::Failed { filename, message } => format!("{filename}\n{message}"),
            RenderBlock::Report(report) => {
                let mut out = report.filename.clone();
                for table in report.tables() {
                    out.push('\n');
                    out.push_str(&table.title);
                    for row in &table.rows {
                        out.push_str(&format!("\n{}\t{}", row.key, row.display_value()));
                    }
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn keys(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn ranks_descending() {
        let rows = top_n(&tally(&[("a", 5.0), ("b", 9.0), ("c", 1.0)]), 5);
        assert_eq!(keys(&rows), ["b", "a", "c"]);
        assert_eq!(rows[0].value, 9.0);
    }

    #[test]
    fn truncates_to_n() {
        let entries = tally(&[
            ("t1", 1.0),
            ("t2", 2.0),
            ("t3", 3.0),
            ("t4", 4.0),
            ("t5", 5.0),
            ("t6", 6.0),
            ("t7", 7.0),
        ]);
        assert_eq!(keys(&top_n(&entries, 5)), ["t7", "t6", "t5", "t4", "t3"]);
        assert!(top_n(&entries, 0).is_empty());
    }

    #[test]
    fn ties_keep_encounter_order() {
        let rows = top_n(&tally(&[("x", 2.0), ("y", 3.0), ("z", 2.0), ("w", 2.0)]), 3);
        assert_eq!(keys(&rows), ["y", "x", "z"]);
    }

    #[test]
    fn hourly_rows_are_not_resorted() {
        let rows = in_order(&tally(&[("11:00", 3.0), ("09:00", 8.0), ("10:00", 1.0)]));
        assert_eq!(keys(&rows), ["11:00", "09:00", "10:00"]);
    }

    #[test]
    fn display_drops_trailing_zero() {
        assert_eq!(Row::new("a", 9.0).display_value(), "9");
        assert_eq!(Row::new("a", 12.5).display_value(), "12.5");
    }

    #[test]
    fn report_links_export_for_file() {
        let data = AnalysisData {
            token_counts: tally(&[("a", 5.0), ("b", 9.0)]),
            quantity_per_token: tally(&[("a", 100.0), ("b", 50.0)]),
            entries_per_hour: tally(&[("09:00", 2.0)]),
            quantity_per_hour: tally(&[("09:00", 150.0)]),
        };
        let report = FileReport::from_analysis("orders 1.csv", &data, &ClientConfig::default());
        assert_eq!(report.export_href, "/export-processed-data?file=orders%201.csv");
        assert_eq!(keys(&report.top_by_orders.rows), ["b", "a"]);
        assert_eq!(keys(&report.top_by_quantity.rows), ["a", "b"]);
        assert_eq!(report.top_by_orders.title, "Top 5 Tokens by Number of Orders");

        let text = RenderBlock::Report(report).text();
        assert!(text.starts_with("orders 1.csv"));
        assert!(text.contains("b\t9"));
        assert!(text.contains("09:00\t150"));
    }

    #[test]
    fn failed_block_text_has_message() {
        let block = RenderBlock::Failed {
            filename: "x.csv".into(),
            message: "bad file".into(),
        };
        assert!(block.is_failure());
        assert_eq!(block.filename(), "x.csv");
        assert!(block.text().contains("bad file"));
    }
}
