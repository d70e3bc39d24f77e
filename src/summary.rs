use serde::Serialize;

use crate::models::{DtypeResult, ReconciliationResult, ValueResult, Verdict};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub value_correct: usize,
    pub value_wrong: usize,
    pub dtype_correct: usize,
    pub dtype_wrong: usize,
    pub dtype_not_applicable: usize,
}

impl Counts {
    fn add(&mut self, v: &Verdict) {
        self.total += 1;
        match v.value() {
            ValueResult::Correct => self.value_correct += 1,
            ValueResult::Wrong => self.value_wrong += 1,
        }
        match v.dtype() {
            DtypeResult::Correct => self.dtype_correct += 1,
            DtypeResult::Wrong => self.dtype_wrong += 1,
            DtypeResult::NotApplicable => self.dtype_not_applicable += 1,
        }
    }

    /// Share of value checks that matched. An empty comparison scores 100.
    pub fn value_accuracy(&self) -> f64 {
        accuracy(self.value_correct, self.total)
    }

    /// Share of applicable data-type checks that matched.
    pub fn dtype_accuracy(&self) -> f64 {
        accuracy(self.dtype_correct, self.dtype_correct + self.dtype_wrong)
    }
}

pub fn accuracy(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    correct as f64 / total as f64 * 100.0
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    pub counts: Counts,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub overall: Counts,
    pub sheets: Vec<SheetSummary>,
    pub skipped_sheets: usize,
}

impl Summary {
    pub fn from_result(result: &ReconciliationResult) -> Self {
        let mut overall = Counts::default();
        let sheets = result
            .sheets
            .iter()
            .map(|s| {
                let mut counts = Counts::default();
                for v in &s.verdicts {
                    counts.add(v);
                    overall.add(v);
                }
                SheetSummary { sheet: s.sheet.clone(), counts }
            })
            .collect();
        Self {
            overall,
            sheets,
            skipped_sheets: result.warnings.len(),
        }
    }

    /// Overall score: matching values over all checks.
    pub fn accuracy(&self) -> f64 {
        self.overall.value_accuracy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SheetVerdicts, SheetWarning};

    fn verdict(dtype: DtypeResult, value: ValueResult) -> Verdict {
        Verdict::new(
            "S",
            "A4".into(),
            "F".into(),
            "1".into(),
            "2".into(),
            dtype,
            String::new(),
            value,
            String::new(),
        )
    }

    #[test]
    fn test_empty_result_is_perfect() {
        let summary = Summary::from_result(&ReconciliationResult::default());
        assert_eq!(summary.overall.total, 0);
        assert_eq!(summary.accuracy(), 100.0);
        assert_eq!(summary.overall.dtype_accuracy(), 100.0);
        assert!(!summary.accuracy().is_nan());
    }

    #[test]
    fn test_counts_split_by_dimension() {
        let result = ReconciliationResult {
            sheets: vec![
                SheetVerdicts {
                    sheet: "S".into(),
                    verdicts: vec![
                        verdict(DtypeResult::NotApplicable, ValueResult::Correct),
                        verdict(DtypeResult::Correct, ValueResult::Correct),
                        verdict(DtypeResult::Wrong, ValueResult::Correct),
                    ],
                },
                SheetVerdicts {
                    sheet: "T".into(),
                    verdicts: vec![verdict(DtypeResult::Correct, ValueResult::Wrong)],
                },
            ],
            warnings: vec![SheetWarning { sheet: "U".into(), reason: "bad".into() }],
            cancelled: false,
        };
        let summary = Summary::from_result(&result);
        let o = &summary.overall;
        assert_eq!(o.total, 4);
        assert_eq!((o.value_correct, o.value_wrong), (3, 1));
        assert_eq!((o.dtype_correct, o.dtype_wrong, o.dtype_not_applicable), (2, 1, 1));
        assert_eq!(summary.accuracy(), 75.0);
        assert!((o.dtype_accuracy() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.sheets.len(), 2);
        assert_eq!(summary.sheets[1].counts.value_wrong, 1);
        assert_eq!(summary.skipped_sheets, 1);
    }

    #[test]
    fn test_accuracy_helper() {
        assert_eq!(accuracy(0, 0), 100.0);
        assert_eq!(accuracy(1, 4), 25.0);
        assert_eq!(accuracy(0, 3), 0.0);
    }
}
