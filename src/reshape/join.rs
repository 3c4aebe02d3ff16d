//! Inner join of a sale-side and a rent-side series on (date, region).
//!
//! Keys present on only one side are dropped without error. The number of
//! dropped keys is logged so completeness can still be checked by a caller
//! that cares.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{JointRecord, JointTable, MetricRecord, MetricSeries, Side};
use crate::error::{CoreError, CoreResult};

/// Join two normalized series into one table of (sale, rent) pairs.
///
/// Argument order does not matter: values are placed by the metric's side.
/// Output follows the order of `a`; for repeated keys every pairing is kept.
pub fn join(a: &MetricSeries, b: &MetricSeries) -> CoreResult<JointTable> {
    let (left_side, right_side) = (a.metric.side(), b.metric.side());
    if left_side == right_side || a.metric.kind() != b.metric.kind() {
        return Err(CoreError::IncompatibleMetrics {
            left: a.metric,
            right: b.metric,
        });
    }
    let kind = a.metric.kind();

    if a.is_empty() || b.is_empty() {
        debug!(left = %a.metric, right = %b.metric, "join input empty");
        return Ok(JointTable::empty(kind));
    }

    let mut index: HashMap<(NaiveDate, &str), Vec<&MetricRecord>> = HashMap::with_capacity(b.len());
    for rec in &b.records {
        index
            .entry((rec.date, rec.region.as_str()))
            .or_default()
            .push(rec);
    }

    let mut records = Vec::with_capacity(a.len().min(b.len()));
    let mut unmatched_left = 0usize;
    let mut matched: HashSet<(NaiveDate, &str)> = HashSet::new();

    for left in &a.records {
        let key = (left.date, left.region.as_str());
        let Some(matches) = index.get(&key) else {
            unmatched_left += 1;
            continue;
        };
        for right in matches {
            let (sale, rent) = match left_side {
                Side::Sale => (left.value, right.value),
                Side::Rent => (right.value, left.value),
            };
            records.push(JointRecord {
                date: left.date,
                region: left.region.clone(),
                sale,
                rent,
            });
        }
        matched.insert(key);
    }

    let unmatched_right: usize = index
        .iter()
        .filter(|(key, _)| !matched.contains(*key))
        .map(|(_, recs)| recs.len())
        .sum();

    debug!(
        left = %a.metric,
        right = %b.metric,
        rows = records.len(),
        unmatched_left,
        unmatched_right,
        matched_keys = matched.len(),
        "joined series"
    );

    Ok(JointTable { kind, records })
}
