//! Columnar storage for a run and the result document built from it.
use super::program::{Program, Slot};
use crate::model::TimeConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row per slot, one column per grid point.
#[derive(Debug, Clone)]
pub struct Ledger {
    rows: Vec<Vec<f64>>,
    points: usize,
}

impl Ledger {
    pub fn new(slot_count: usize, points: usize) -> Self {
        Self { rows: vec![vec![0.0; points]; slot_count], points }
    }

    pub fn points(&self) -> usize {
        self.points
    }

    /// Copies a fully evaluated frame into column `point`.
    pub fn record(&mut self, point: usize, frame: &[f64]) {
        for (row, &value) in self.rows.iter_mut().zip(frame) {
            row[point] = value;
        }
    }

    #[inline(always)]
    pub fn row(&self, slot: Slot) -> &[f64] {
        &self.rows[slot.index()]
    }

    /// Gives up the rows, indexed by slot.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub model_name: String,
    /// Parameter values actually used, after overrides.
    pub parameters: BTreeMap<String, f64>,
    pub time_config: TimeConfig,
}

/// The full time series of one run. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub time: Vec<f64>,
    pub stocks: BTreeMap<String, Vec<f64>>,
    pub flows: BTreeMap<String, Vec<f64>>,
    pub auxiliaries: BTreeMap<String, Vec<f64>>,
    pub metadata: RunMetadata,
}

impl SimulationResult {
    /// Moves the ledger's rows into named series; parameter rows are dropped.
    pub(crate) fn from_ledger(program: &Program, ledger: Ledger, metadata: RunMetadata) -> Self {
        let mut rows = ledger.into_rows();
        let mut series = |slots: std::ops::Range<usize>| -> BTreeMap<String, Vec<f64>> {
            slots.map(|i| (program.names[i].clone(), std::mem::take(&mut rows[i]))).collect()
        };
        let stocks = series(program.stock_slots.clone());
        let flows = series(program.flow_slots.clone());
        let auxiliaries = series(program.auxiliary_slots.clone());
        let time = std::mem::take(&mut rows[super::program::TIME_SLOT.index()]);
        Self { time, stocks, flows, auxiliaries, metadata }
    }

    /// Looks a variable up across stocks, flows and auxiliaries.
    pub fn series(&self, id: &str) -> Option<&[f64]> {
        self.stocks
            .get(id)
            .or_else(|| self.flows.get(id))
            .or_else(|| self.auxiliaries.get(id))
            .map(Vec::as_slice)
    }

    /// Values of every stock, flow and auxiliary at grid point `index`.
    pub fn snapshot(&self, index: usize) -> BTreeMap<&str, f64> {
        let all = self.stocks.iter().chain(&self.flows).chain(&self.auxiliaries);
        all.filter_map(|(id, values)| values.get(index).map(|&v| (id.as_str(), v))).collect()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_columnar() {
        let mut ledger = Ledger::new(3, 2);
        ledger.record(0, &[0.0, 10.0, 1.0]);
        ledger.record(1, &[1.0, 11.0, 2.0]);
        assert_eq!(ledger.row(Slot(0)), &[0.0, 1.0]);
        assert_eq!(ledger.row(Slot(1)), &[10.0, 11.0]);
        assert_eq!(ledger.row(Slot(2)), &[1.0, 2.0]);
    }

    #[test]
    fn test_into_rows_hands_over_each_slot() {
        let mut ledger = Ledger::new(2, 3);
        for point in 0..3 {
            ledger.record(point, &[point as f64, 10.0 * point as f64]);
        }
        let rows = ledger.into_rows();
        assert_eq!(rows, vec![vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0]]);
    }
}
