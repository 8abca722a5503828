//! Toggle-count comparison between two traces.
//!
//! The clean (reference) trace drives the iteration: every
//! signal it declares is matched by name against the candidate
//! trace and scored with a relative deviation percentage.
//! Signals present in only one trace cannot be scored; they are
//! surfaced separately instead of producing records.

use crate::ToggleDB;
use compact_str::CompactString;
use serde::{ Serialize, Deserialize };

/// Deviation percentage above which a signal is conventionally
/// flagged as suspicious.
pub const DEFAULT_THRESHOLD: f64 = 25.0;

/// Toggle counts of one signal in both traces, with the
/// relative deviation of the candidate from the reference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SignalDeviation {
    pub name: CompactString,
    /// Toggle count in the clean reference trace.
    pub clean: u64,
    /// Toggle count in the candidate trace.
    pub trojan: u64,
    /// See [`deviation_pct`].
    pub deviation_pct: f64,
}

impl SignalDeviation {
    /// Whether this signal deviates beyond `threshold` percent.
    #[inline]
    pub fn is_suspicious(&self, threshold: f64) -> bool {
        self.deviation_pct > threshold
    }
}

/// Outcome of comparing two toggle databases.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Comparison {
    /// Signals present in both traces, in the declaration order
    /// of the clean trace.
    pub deviations: Vec<SignalDeviation>,
    /// Signals only the clean trace declares.
    pub clean_only: Vec<CompactString>,
    /// Signals only the candidate trace declares.
    pub trojan_only: Vec<CompactString>,
}

/// What an external chart renderer needs to draw the two-panel
/// count/deviation comparison: the scored signals in clean
/// declaration order, plus the threshold line.
#[derive(Serialize, Deserialize, Debug)]
pub struct PlotInput {
    pub threshold: f64,
    pub deviations: Vec<SignalDeviation>,
}

/// Match two toggle databases by signal name and compute the
/// per-signal deviation percentages.
pub fn compare_toggles(
    clean: &ToggleDB, trojan: &ToggleDB
) -> Comparison {
    let mut cmp = Comparison::default();
    for (name, &clean_count) in clean.toggles.iter() {
        let trojan_count = match trojan.toggles.get(name) {
            Some(&c) => c,
            None => {
                cmp.clean_only.push(name.clone());
                continue;
            }
        };
        cmp.deviations.push(SignalDeviation {
            name: name.clone(),
            clean: clean_count,
            trojan: trojan_count,
            deviation_pct: deviation_pct(
                clean_count, trojan_count),
        });
    }
    cmp.trojan_only = trojan.toggles.keys()
        .filter(|name| !clean.toggles.contains_key(name.as_str()))
        .cloned()
        .collect();
    if !cmp.clean_only.is_empty() || !cmp.trojan_only.is_empty() {
        clilog::warn!(
            TGDF_MISSING,
            "{} signals skipped in comparison \
             ({} only in clean, {} only in trojan)",
            cmp.clean_only.len() + cmp.trojan_only.len(),
            cmp.clean_only.len(), cmp.trojan_only.len()
        );
    }
    cmp
}

/// Relative deviation of `trojan` from `clean` in percent,
/// `|trojan - clean| / clean * 100`.
///
/// A zero reference saturates: any candidate activity on a
/// signal that never toggled cleanly scores a flat 100,
/// regardless of magnitude.
#[inline]
pub fn deviation_pct(clean: u64, trojan: u64) -> f64 {
    if clean > 0 {
        (trojan as f64 - clean as f64).abs()
            / clean as f64 * 100.0
    } else if trojan == 0 {
        0.0
    } else {
        100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(entries: &[(&str, u64)]) -> ToggleDB {
        let mut db = ToggleDB::new();
        for &(name, count) in entries {
            db.toggles.insert(name.into(), count);
        }
        db
    }

    #[test]
    fn test_deviation_formula() {
        assert_eq!(deviation_pct(10, 10), 0.0);
        assert_eq!(deviation_pct(4, 6), 50.0);
        assert_eq!(deviation_pct(4, 0), 100.0);
        assert_eq!(deviation_pct(4, 12), 200.0);
    }

    #[test]
    fn test_deviation_is_asymmetric() {
        // the reference count is the denominator, so swapping
        // the traces changes the score
        assert_eq!(deviation_pct(6, 4), 2.0 / 6.0 * 100.0);
        assert_ne!(deviation_pct(4, 6), deviation_pct(6, 4));
    }

    #[test]
    fn test_zero_reference_saturation() {
        assert_eq!(deviation_pct(0, 0), 0.0);
        assert_eq!(deviation_pct(0, 1), 100.0);
        assert_eq!(deviation_pct(0, 1_000_000), 100.0);
    }

    #[test]
    fn test_compare_order_and_missing() {
        let clean = db(&[("a", 2), ("b", 0), ("gone", 5)]);
        let trojan = db(&[("extra", 1), ("b", 3), ("a", 2)]);
        let cmp = compare_toggles(&clean, &trojan);
        // records follow the clean declaration order, not the
        // candidate's
        let names = cmp.deviations.iter()
            .map(|d| d.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(cmp.deviations[0].deviation_pct, 0.0);
        assert_eq!(cmp.deviations[1].deviation_pct, 100.0);
        assert_eq!(cmp.clean_only, ["gone"]);
        assert_eq!(cmp.trojan_only, ["extra"]);
    }

    #[test]
    fn test_suspicious_is_strictly_above_threshold() {
        let d = SignalDeviation {
            name: "s".into(), clean: 4, trojan: 5,
            deviation_pct: deviation_pct(4, 5),
        };
        assert_eq!(d.deviation_pct, 25.0);
        assert!(!d.is_suspicious(DEFAULT_THRESHOLD));
        assert!(d.is_suspicious(20.0));
    }
}
