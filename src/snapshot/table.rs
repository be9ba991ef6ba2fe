//! Per-class metric tables.
//!
//! A table is a list of class names plus one parallel column per metric the
//! table's kind captures. Tables are built once per capture and never
//! mutated; the next capture produces a new table.

use super::filter::ClassFilter;
use super::kind::{Metric, SnapshotKind, TableKind};
use super::ratio::Ratio;
use crate::utils::error::SnapshotError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A single cell of a metrics table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Object counts, byte sizes and generation counts
    Count(i64),
    /// Average object age
    Average(f64),
}

impl MetricValue {
    /// Zero of the right flavour for `metric`
    pub fn zero(metric: Metric) -> Self {
        if metric.is_fractional() {
            MetricValue::Average(0.0)
        } else {
            MetricValue::Count(0)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Count(v) => v as f64,
            MetricValue::Average(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            MetricValue::Count(v) => v == 0,
            MetricValue::Average(v) => v == 0.0,
        }
    }

    pub fn abs(self) -> Self {
        match self {
            MetricValue::Count(v) => MetricValue::Count(v.saturating_abs()),
            MetricValue::Average(v) => MetricValue::Average(v.abs()),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            MetricValue::Count(v) => MetricValue::Count(v.saturating_neg()),
            MetricValue::Average(v) => MetricValue::Average(-v),
        }
    }

    /// `self - other`; mixed flavours fall back to floating point
    pub fn delta(self, other: Self) -> Self {
        match (self, other) {
            (MetricValue::Count(a), MetricValue::Count(b)) => MetricValue::Count(a.saturating_sub(b)),
            (a, b) => MetricValue::Average(a.as_f64() - b.as_f64()),
        }
    }

    pub fn add(self, other: Self) -> Self {
        match (self, other) {
            (MetricValue::Count(a), MetricValue::Count(b)) => MetricValue::Count(a.saturating_add(b)),
            (a, b) => MetricValue::Average(a.as_f64() + b.as_f64()),
        }
    }

    /// Total order over values; NaN averages sort last
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MetricValue::Count(a), MetricValue::Count(b)) => a.cmp(b),
            (a, b) => a.as_f64().total_cmp(&b.as_f64()),
        }
    }

    pub fn max(self, other: Self) -> Self {
        if other.cmp_value(&self) == Ordering::Greater {
            other
        } else {
            self
        }
    }

    pub fn min(self, other: Self) -> Self {
        if other.cmp_value(&self) == Ordering::Less {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(v) => write!(f, "{}", v),
            MetricValue::Average(v) => write!(f, "{:.1}", v),
        }
    }
}

/// Raw values of one metric, as delivered by the capture feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricColumn {
    Counts(Vec<i64>),
    Averages(Vec<f64>),
}

impl MetricColumn {
    pub fn len(&self) -> usize {
        match self {
            MetricColumn::Counts(v) => v.len(),
            MetricColumn::Averages(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<MetricValue> {
        match self {
            MetricColumn::Counts(v) => v.get(row).copied().map(MetricValue::Count),
            MetricColumn::Averages(v) => v.get(row).copied().map(MetricValue::Average),
        }
    }

    /// Convert the column to the flavour `metric` expects.
    ///
    /// Whole numbers are accepted for averages; fractional values are
    /// rejected for counts.
    fn conform_to(self, metric: Metric) -> Result<Self, SnapshotError> {
        match (self, metric.is_fractional()) {
            (MetricColumn::Counts(v), true) => {
                Ok(MetricColumn::Averages(v.into_iter().map(|x| x as f64).collect()))
            }
            (MetricColumn::Averages(v), false) => {
                if v.iter().all(|x| x.fract() == 0.0) {
                    Ok(MetricColumn::Counts(v.into_iter().map(|x| x as i64).collect()))
                } else {
                    Err(SnapshotError::FractionalCounts { metric })
                }
            }
            (column, _) => Ok(column),
        }
    }

    /// Build a column from cell values, keeping the flavour of `metric`
    pub(crate) fn from_values(metric: Metric, values: impl IntoIterator<Item = MetricValue>) -> Self {
        if metric.is_fractional() {
            MetricColumn::Averages(values.into_iter().map(MetricValue::as_f64).collect())
        } else {
            MetricColumn::Counts(
                values
                    .into_iter()
                    .map(|v| match v {
                        MetricValue::Count(c) => c,
                        MetricValue::Average(a) => a as i64,
                    })
                    .collect(),
            )
        }
    }
}

/// Ordering applied to table rows by tabular consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    ClassName,
    Metric(Metric),
}

/// Immutable per-class metrics for one capture (or one diff)
///
/// **Public** - the read side every table view consumes
#[derive(Debug, Clone)]
pub struct ClassMetricsTable {
    kind: TableKind,
    class_names: Vec<String>,
    columns: BTreeMap<Metric, MetricColumn>,
    row_count: usize,
    index: HashMap<String, usize>,
}

impl ClassMetricsTable {
    /// Build a snapshot table from raw parallel sequences
    ///
    /// # Arguments
    /// * `kind` - Profiling mode the data was captured in
    /// * `class_names` - Class names in VM form, one per row
    /// * `columns` - One column per metric of `kind`
    ///
    /// # Returns
    /// A table whose row count is the length of the shortest sequence.
    /// Mismatched lengths are expected when the agent delivers arrays that
    /// grew mid-capture and are not an error.
    ///
    /// # Errors
    /// * `SnapshotError::UnsupportedMetric` - a column `kind` does not capture
    /// * `SnapshotError::MissingMetric` - a column `kind` requires is absent
    /// * `SnapshotError::FractionalCounts` - fractional values in a count column
    /// * `SnapshotError::DuplicateClass` - a class name occurs twice
    pub fn new(
        kind: SnapshotKind,
        class_names: Vec<String>,
        columns: impl IntoIterator<Item = (Metric, MetricColumn)>,
    ) -> Result<Self, SnapshotError> {
        Self::from_parts(TableKind::Snapshot(kind), class_names, columns)
    }

    pub(crate) fn from_parts(
        kind: TableKind,
        class_names: Vec<String>,
        columns: impl IntoIterator<Item = (Metric, MetricColumn)>,
    ) -> Result<Self, SnapshotError> {
        let mut by_metric = BTreeMap::new();
        for (metric, column) in columns {
            if !kind.supports(metric) {
                return Err(SnapshotError::UnsupportedMetric { metric, kind });
            }
            by_metric.insert(metric, column.conform_to(metric)?);
        }

        if let Some(&metric) = kind.metrics().iter().find(|m| !by_metric.contains_key(m)) {
            return Err(SnapshotError::MissingMetric { metric, kind });
        }

        let row_count = by_metric
            .values()
            .map(MetricColumn::len)
            .fold(class_names.len(), usize::min);

        if row_count < class_names.len() || by_metric.values().any(|c| c.len() != row_count) {
            debug!(
                "Clamping {} table to {} rows ({} class names, column lengths {:?})",
                kind,
                row_count,
                class_names.len(),
                by_metric.values().map(MetricColumn::len).collect::<Vec<_>>()
            );
        }

        let mut index = HashMap::with_capacity(row_count);
        for (row, name) in class_names.iter().take(row_count).enumerate() {
            if index.insert(name.clone(), row).is_some() {
                return Err(SnapshotError::DuplicateClass(name.clone()));
            }
        }

        Ok(Self {
            kind,
            class_names,
            columns: by_metric,
            row_count,
            index,
        })
    }

    /// An empty table of the given kind
    pub fn empty(kind: SnapshotKind) -> Self {
        let columns = kind
            .metrics()
            .iter()
            .map(|&m| (m, MetricColumn::from_values(m, std::iter::empty())));
        // An empty table satisfies every construction check.
        match Self::new(kind, Vec::new(), columns) {
            Ok(table) => table,
            Err(e) => unreachable!("empty table rejected: {}", e),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Class name of `row`
    ///
    /// # Panics
    /// If `row >= self.row_count()`.
    pub fn class_name(&self, row: usize) -> &str {
        self.check_row(row);
        &self.class_names[row]
    }

    /// Class names of all visible rows
    pub fn class_names(&self) -> &[String] {
        &self.class_names[..self.row_count]
    }

    /// Value of `metric` at `row`, or `None` when this kind does not capture
    /// `metric`
    ///
    /// # Panics
    /// If `row >= self.row_count()`.
    pub fn metric(&self, metric: Metric, row: usize) -> Option<MetricValue> {
        self.check_row(row);
        self.columns.get(&metric).and_then(|c| c.get(row))
    }

    /// All visible values of `metric`
    pub fn values(&self, metric: Metric) -> Option<impl Iterator<Item = MetricValue> + '_> {
        let column = self.columns.get(&metric)?;
        Some((0..self.row_count).filter_map(move |row| column.get(row)))
    }

    /// Row of `class_name`, if the class is in this table
    pub fn find_row(&self, class_name: &str) -> Option<usize> {
        self.index.get(class_name).copied()
    }

    /// Aggregate of `metric` over all rows: the sum for additive metrics,
    /// the maximum otherwise
    pub fn total(&self, metric: Metric) -> Option<MetricValue> {
        let zero = MetricValue::zero(metric);
        let values = self.values(metric)?;
        Some(if metric.is_additive() {
            values.fold(zero, MetricValue::add)
        } else {
            values.fold(zero, MetricValue::max)
        })
    }

    /// Value a proportional bar for `metric` is scaled against.
    ///
    /// For snapshots this is [`total`](Self::total); for diff tables it is the
    /// symmetric bound `max(|max|, |min|)` so growth and shrinkage share one
    /// scale around zero.
    pub fn scale_bound(&self, metric: Metric) -> Option<MetricValue> {
        if !self.kind.is_diff() {
            return self.total(metric);
        }
        let zero = MetricValue::zero(metric);
        let (max, min) = self
            .values(metric)?
            .fold((zero, zero), |(max, min), v| (max.max(v), min.min(v)));
        Some(max.abs().max(min.abs()))
    }

    /// Share of `row` in the bar scale of `metric`.
    ///
    /// For diff tables the result lies in -100%..=100%.
    pub fn share(&self, metric: Metric, row: usize) -> Ratio {
        match (self.metric(metric, row), self.scale_bound(metric)) {
            (Some(value), Some(bound)) => Ratio::of(value.as_f64(), bound.as_f64()),
            _ => Ratio::NotApplicable,
        }
    }

    /// Row indices ordered by `order`. The sort is stable: equal rows keep
    /// table order.
    pub fn sorted_rows(&self, order: RowOrder, ascending: bool) -> Vec<usize> {
        let mut rows: Vec<usize> = (0..self.row_count).collect();
        match order {
            RowOrder::ClassName => rows.sort_by(|&a, &b| {
                let ord = self.class_names[a].cmp(&self.class_names[b]);
                if ascending { ord } else { ord.reverse() }
            }),
            RowOrder::Metric(metric) => {
                if let Some(column) = self.columns.get(&metric) {
                    rows.sort_by(|&a, &b| {
                        let ord = match (column.get(a), column.get(b)) {
                            (Some(x), Some(y)) => x.cmp_value(&y),
                            _ => Ordering::Equal,
                        };
                        if ascending { ord } else { ord.reverse() }
                    });
                }
            }
        }
        rows
    }

    /// A new table holding only the rows whose class passes `filter`
    pub fn filtered(&self, filter: &ClassFilter) -> ClassMetricsTable {
        let rows: Vec<usize> = (0..self.row_count)
            .filter(|&row| filter.passes(&self.class_names[row]))
            .collect();
        self.select_rows(&rows)
    }

    /// A new table made of `rows`, in the given order
    pub(crate) fn select_rows(&self, rows: &[usize]) -> ClassMetricsTable {
        let class_names: Vec<String> = rows.iter().map(|&r| self.class_names[r].clone()).collect();
        let columns: BTreeMap<Metric, MetricColumn> = self
            .columns
            .iter()
            .map(|(&metric, column)| {
                let values = rows.iter().filter_map(|&r| column.get(r));
                (metric, MetricColumn::from_values(metric, values))
            })
            .collect();
        let index = class_names
            .iter()
            .enumerate()
            .map(|(row, name)| (name.clone(), row))
            .collect();
        ClassMetricsTable {
            kind: self.kind,
            row_count: class_names.len(),
            class_names,
            columns,
            index,
        }
    }

    fn check_row(&self, row: usize) {
        assert!(
            row < self.row_count,
            "row {} out of range for a table of {} rows",
            row,
            self.row_count
        );
    }
}
