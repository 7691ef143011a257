use std::collections::BTreeMap;

use crate::model::{ContractorSummary, ShipmentRecord, SlaStatus};
use crate::schema::SheetColumns;

#[derive(Default)]
struct Counts {
    total: usize,
    green: usize,
    yellow: usize,
    red: usize,
    pending: usize,
}

/// Group classified records by driver and count SLA outcomes.
///
/// Records are expected to carry their SLA outcome already; unclassified
/// records count as pending. Rows with a blank driver are not grouped.
pub fn summarize(records: &[ShipmentRecord], cols: &SheetColumns) -> Vec<ContractorSummary> {
    let mut groups: BTreeMap<String, Counts> = BTreeMap::new();

    for record in records {
        let Some(driver) = record.driver(cols) else {
            continue;
        };
        let entry = groups.entry(driver).or_default();
        entry.total += 1;
        match record.sla_status() {
            SlaStatus::Green => entry.green += 1,
            SlaStatus::Yellow => entry.yellow += 1,
            SlaStatus::Red => entry.red += 1,
            SlaStatus::Pending => entry.pending += 1,
        }
    }

    groups
        .into_iter()
        .map(|(driver, c)| {
            let delivered = c.green + c.yellow + c.red;
            ContractorSummary {
                driver,
                delivered,
                delivered_sla: c.green,
                delivered_exceeded: c.red,
                pending: c.pending,
                total: c.total,
                pct_delivered_sla: ratio(c.green, c.total),
                pct_pending: ratio(c.pending, c.total),
                pct_delivered: ratio(delivered, c.total),
            }
        })
        .collect()
}

/// `part / total` rounded to two decimals. Groups always have `total >= 1`.
fn ratio(part: usize, total: usize) -> f64 {
    (part as f64 / total as f64 * 100.0).round() / 100.0
}
