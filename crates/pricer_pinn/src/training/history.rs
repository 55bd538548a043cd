//! Loss history of a training run.

use crate::loss::LossBreakdown;

/// Loss components recorded at one epoch, before that epoch's update.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrainingRecord {
    /// Zero-based epoch.
    pub epoch: usize,
    /// Weighted total loss.
    pub total: f64,
    /// PDE residual loss.
    pub pde: f64,
    /// Terminal payoff loss.
    pub terminal: f64,
    /// Spot boundary loss.
    pub boundary: f64,
}

impl TrainingRecord {
    /// Record of `breakdown` at `epoch`.
    pub fn new(epoch: usize, breakdown: LossBreakdown) -> Self {
        Self {
            epoch,
            total: breakdown.total,
            pde: breakdown.pde,
            terminal: breakdown.terminal,
            boundary: breakdown.boundary,
        }
    }
}

/// Append-only sequence of [`TrainingRecord`]s in epoch order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TrainingHistory {
    records: Vec<TrainingRecord>,
}

impl TrainingHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, record: TrainingRecord) {
        debug_assert!(self.records.last().map_or(true, |last| last.epoch < record.epoch));
        self.records.push(record);
    }

    /// All records.
    #[inline]
    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    #[inline]
    pub fn last(&self) -> Option<&TrainingRecord> {
        self.records.last()
    }

    /// Total losses in record order.
    pub fn totals(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.total).collect()
    }

    /// Mean total loss of consecutive windows of `window` records.
    ///
    /// A trailing partial window is dropped. Returns an empty vector for
    /// `window == 0`.
    pub fn window_means(&self, window: usize) -> Vec<f64> {
        if window == 0 {
            return Vec::new();
        }
        self.records
            .chunks_exact(window)
            .map(|chunk| chunk.iter().map(|r| r.total).sum::<f64>() / window as f64)
            .collect()
    }
}
