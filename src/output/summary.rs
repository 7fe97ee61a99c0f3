//! Run summary: ticket count per `ANTIGUEDAD` value

use std::collections::BTreeMap;

use crate::pipeline::ClassifiedTicket;

/// One line of the summary
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub antiguedad: String,
    pub count: usize,
    pub percent: f64,
}

/// Counts sorted by value
pub fn summarize(rows: &[ClassifiedTicket]) -> Vec<SummaryLine> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.result.antiguedad()).or_default() += 1;
    }

    let total = rows.len();
    counts
        .into_iter()
        .map(|(antiguedad, count)| SummaryLine {
            antiguedad: antiguedad.to_string(),
            count,
            percent: count as f64 * 100.0 / total as f64,
        })
        .collect()
}
