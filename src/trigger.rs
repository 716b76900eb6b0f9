//! # Trigger-object matching
//!
//! Trigger objects are the candidates reconstructed online by the trigger system. Each
//! one carries the labels of the filters it passed. The electron output stores, per
//! candidate, one boolean per *trigger bucket*: a bucket is the set of trigger objects
//! carrying one configured filter label.
//!
//! Matching happens in two steps:
//!
//! 1. [`TriggerMatcher::partition`] splits the event's trigger objects into buckets once
//!    per event. An object carrying several configured labels lands in several buckets.
//! 2. [`TriggerBuckets::matches`] tests a candidate against every bucket. Bucket `i`
//!    matches as soon as one of its objects lies within ΔR < [`HLT_MATCH_DR`].
use crate::{
    constants::{
        HltMatches, ELECTRON_HLT_OBJECT_NAMES, ELECTRON_HLT_TABLE, HLT_MATCH_DR,
        N_ELECTRON_HLT_OBJECTS,
    },
    fill_errors::FillError,
    kinematics::{delta_r2, Momentum},
    output::LabelTable,
};

/// A trigger-level candidate with the filter labels it passed.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerObject {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub filter_labels: Vec<String>,
}

impl TriggerObject {
    pub fn has_filter_label(&self, label: &str) -> bool {
        self.filter_labels.iter().any(|l| l == label)
    }
}

impl Momentum for TriggerObject {
    fn pt(&self) -> f64 {
        self.pt
    }
    fn eta(&self) -> f64 {
        self.eta
    }
    fn phi(&self) -> f64 {
        self.phi
    }
}

/// Ordered filter labels, one per electron trigger bucket.
#[derive(Debug, Clone)]
pub struct TriggerMatcher {
    filters: Vec<String>,
}

impl TriggerMatcher {
    /// Validate the configured filter labels.
    ///
    /// Arguments
    /// -----------------
    /// * `filters`: one label per bucket, in bucket order.
    ///
    /// Return
    /// ----------
    /// * A [`FillError::Configuration`] naming `hltFilters` if the list length differs from
    ///   [`N_ELECTRON_HLT_OBJECTS`].
    pub fn new(filters: Vec<String>) -> Result<Self, FillError> {
        if filters.len() != N_ELECTRON_HLT_OBJECTS {
            return Err(FillError::configuration(
                "hltFilters",
                format!(
                    "expected {N_ELECTRON_HLT_OBJECTS} filter labels, got {}",
                    filters.len()
                ),
            ));
        }
        Ok(TriggerMatcher { filters })
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Split the event's trigger objects into buckets.
    pub fn partition<'a>(&self, objects: &'a [TriggerObject]) -> TriggerBuckets<'a> {
        let mut buckets: [Vec<&'a TriggerObject>; N_ELECTRON_HLT_OBJECTS] = Default::default();
        for obj in objects {
            for (bucket, filter) in buckets.iter_mut().zip(&self.filters) {
                if obj.has_filter_label(filter) {
                    bucket.push(obj);
                }
            }
        }
        TriggerBuckets { buckets }
    }
}

/// Trigger objects of one event, grouped by bucket.
#[derive(Debug, Default)]
pub struct TriggerBuckets<'a> {
    buckets: [Vec<&'a TriggerObject>; N_ELECTRON_HLT_OBJECTS],
}

impl TriggerBuckets<'_> {
    pub fn bucket(&self, index: usize) -> &[&TriggerObject] {
        &self.buckets[index]
    }

    /// Per-bucket match flags for one candidate.
    pub fn matches<C: Momentum + ?Sized>(&self, candidate: &C) -> HltMatches {
        let max_dr2 = HLT_MATCH_DR * HLT_MATCH_DR;
        let mut flags = [false; N_ELECTRON_HLT_OBJECTS];
        for (flag, bucket) in flags.iter_mut().zip(&self.buckets) {
            *flag = bucket.iter().any(|obj| delta_r2(candidate, *obj) < max_dr2);
        }
        flags
    }
}

/// Run-level table interpreting the `match_hlt` array.
pub fn electron_hlt_label_table() -> LabelTable {
    LabelTable::new(ELECTRON_HLT_TABLE, ELECTRON_HLT_OBJECT_NAMES)
}

#[cfg(test)]
mod test_trigger {
    use super::*;

    fn labels() -> Vec<String> {
        (0..N_ELECTRON_HLT_OBJECTS)
            .map(|i| format!("hltFilter{i}"))
            .collect()
    }

    fn trigger_object(eta: f64, phi: f64, labels: &[&str]) -> TriggerObject {
        TriggerObject {
            pt: 30.,
            eta,
            phi,
            filter_labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_wrong_filter_count() {
        let err = TriggerMatcher::new(vec!["hltFilter0".into()]).unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(err, FillError::Configuration { ref option, .. } if option == "hltFilters"));

        let mut too_many = labels();
        too_many.push("extra".into());
        assert!(TriggerMatcher::new(too_many).is_err());
        assert!(TriggerMatcher::new(labels()).is_ok());
    }

    #[test]
    fn test_partition_multi_label() {
        let matcher = TriggerMatcher::new(labels()).unwrap();
        let objects = vec![
            trigger_object(0.0, 0.0, &["hltFilter0", "hltFilter3"]),
            trigger_object(1.0, 1.0, &["hltFilter3"]),
            trigger_object(2.0, 2.0, &["unrelated"]),
        ];
        let buckets = matcher.partition(&objects);
        assert_eq!(buckets.bucket(0).len(), 1);
        assert_eq!(buckets.bucket(3).len(), 2);
        assert!(buckets.bucket(1).is_empty());
    }

    #[test]
    fn test_matches_threshold() {
        let matcher = TriggerMatcher::new(labels()).unwrap();
        let objects = vec![
            trigger_object(1.0, 0.2, &["hltFilter0"]),
            trigger_object(1.0, 0.35, &["hltFilter1"]),
            trigger_object(-1.0, 0.0, &["hltFilter2"]),
        ];
        let buckets = matcher.partition(&objects);

        let candidate = trigger_object(1.0, 0.0, &[]);
        let flags = buckets.matches(&candidate);
        assert!(flags[0]);
        assert!(!flags[1]);
        assert!(!flags[2]);
        assert_eq!(flags.iter().filter(|f| **f).count(), 1);
    }

    #[test]
    fn test_no_trigger_objects() {
        let matcher = TriggerMatcher::new(labels()).unwrap();
        let buckets = matcher.partition(&[]);
        let candidate = trigger_object(0.0, 0.0, &[]);
        assert_eq!(buckets.matches(&candidate), [false; N_ELECTRON_HLT_OBJECTS]);
    }

    #[test]
    fn test_label_table() {
        let table = electron_hlt_label_table();
        assert_eq!(table.name, ELECTRON_HLT_TABLE);
        assert_eq!(table.entries.len(), N_ELECTRON_HLT_OBJECTS);
        assert_eq!(table.entries[0].index, 0);
        assert_eq!(table.entries[0].label, "El23Loose");
    }
}
