//! Rows waiting for their exit animation to finish.

use crate::present::RowRef;
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedRow {
    pub row: RowRef,
    pub due_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct RemovalSchedule {
    marked: Vec<MarkedRow>,
}

impl RemovalSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, row: RowRef, now: OffsetDateTime, delay: Duration) {
        self.marked.push(MarkedRow {
            row,
            due_at: now + delay,
        });
    }

    /// Takes every row whose delay has elapsed, in the order they were marked.
    pub fn take_due(&mut self, now: OffsetDateTime) -> Vec<RowRef> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.marked)
            .into_iter()
            .partition(|marked| marked.due_at <= now);
        self.marked = waiting;
        due.into_iter().map(|marked| marked.row).collect()
    }

    pub fn take_all(&mut self) -> Vec<RowRef> {
        std::mem::take(&mut self.marked)
            .into_iter()
            .map(|marked| marked.row)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }
}
