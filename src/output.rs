//! # Output records
//!
//! Flat, per-event output objects ([`PElectron`], [`PSuperCluster`]) stored in
//! append-only [`Collection`]s owned by the [`OutputEvent`], plus the run-level
//! declarations handed to the external writer: the [`BranchList`] of suppressed fields
//! and the [`RunMetadata`] label tables.
//!
//! Records reference each other by position ([`ElectronSlot`], [`SuperClusterSlot`]) in
//! the *sorted* collection; positions are only meaningful once the owning filler has
//! sorted its collection for the event.
use std::cmp::Ordering;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    constants::{HltMatches, N_ELECTRON_HLT_OBJECTS},
    fill_errors::FillError,
    kinematics::Momentum,
};

// -------------------------------------------------------------------------------------------------
// Slots
// -------------------------------------------------------------------------------------------------

/// Position of an electron in the sorted output collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElectronSlot(pub usize);

/// Position of a super cluster in the sorted output collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuperClusterSlot(pub usize);

// -------------------------------------------------------------------------------------------------
// Collection
// -------------------------------------------------------------------------------------------------

/// Append-only, sortable sequence of output records.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection { items: Vec::new() }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a default record and return it for filling.
    pub fn create_back(&mut self) -> &mut T
    where
        T: Default,
    {
        self.items.push(T::default());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Reorder the collection and return the permutation.
    ///
    /// Arguments
    /// -----------------
    /// * `compare`: ordering of two records. Equal records keep their relative order.
    ///
    /// Return
    /// ----------
    /// * `original[i]`, the pre-sort position of the record now at position `i`.
    pub fn sort_by<F>(&mut self, mut compare: F) -> Vec<usize>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let order: Vec<usize> = (0..self.items.len())
            .sorted_by(|&a, &b| compare(&self.items[a], &self.items[b]).then_with(|| a.cmp(&b)))
            .collect();

        let mut taken: Vec<Option<T>> = self.items.drain(..).map(Some).collect();
        self.items = order
            .iter()
            .filter_map(|&old| taken[old].take())
            .collect();

        order
    }
}

impl<T> std::ops::Index<usize> for Collection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> std::ops::IndexMut<usize> for Collection<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Descending transverse momentum; NaN compares equal.
pub fn pt_greater<T: Momentum>(a: &T, b: &T) -> Ordering {
    b.pt().partial_cmp(&a.pt()).unwrap_or(Ordering::Equal)
}

// -------------------------------------------------------------------------------------------------
// Records
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PElectron {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub charge: i32,

    pub veto: bool,
    pub loose: bool,
    pub medium: bool,
    pub tight: bool,

    pub sieie: f64,
    pub sipip: f64,
    pub h_over_e: f64,

    pub chiso: f64,
    pub nhiso: f64,
    pub phoiso: f64,
    pub puiso: f64,
    pub iso_pu_offset: f64,
    pub ecaliso: f64,
    pub hcaliso: f64,

    /// Isolations of the photon sharing this electron's super cluster, pileup-corrected.
    pub chiso_ph: f64,
    pub nhiso_ph: f64,
    pub phiso_ph: f64,

    pub match_hlt: HltMatches,

    // simulation only, filled downstream
    pub tau_decay: Option<bool>,
    pub had_decay: Option<bool>,
    pub matched_gen: Option<usize>,

    /// Set in the reference-resolution pass.
    pub super_cluster: Option<SuperClusterSlot>,
}

impl Default for PElectron {
    fn default() -> Self {
        PElectron {
            pt: 0.,
            eta: 0.,
            phi: 0.,
            charge: 0,
            veto: false,
            loose: false,
            medium: false,
            tight: false,
            sieie: 0.,
            sipip: 0.,
            h_over_e: 0.,
            chiso: 0.,
            nhiso: 0.,
            phoiso: 0.,
            puiso: 0.,
            iso_pu_offset: 0.,
            ecaliso: 0.,
            hcaliso: 0.,
            chiso_ph: 0.,
            nhiso_ph: 0.,
            phiso_ph: 0.,
            match_hlt: [false; N_ELECTRON_HLT_OBJECTS],
            tau_decay: None,
            had_decay: None,
            matched_gen: None,
            super_cluster: None,
        }
    }
}

impl PElectron {
    /// Copy the kinematics of any candidate.
    pub fn fill_p4<M: Momentum>(&mut self, source: &M) {
        self.pt = source.pt();
        self.eta = source.eta();
        self.phi = source.phi();
    }
}

impl Momentum for PElectron {
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

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PSuperCluster {
    pub raw_pt: f64,
    pub eta: f64,
    pub phi: f64,
}

impl Momentum for PSuperCluster {
    fn pt(&self) -> f64 {
        self.raw_pt
    }
    fn eta(&self) -> f64 {
        self.eta
    }
    fn phi(&self) -> f64 {
        self.phi
    }
}

/// Everything written for one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputEvent {
    pub electrons: Collection<PElectron>,
    pub super_clusters: Collection<PSuperCluster>,
}

// -------------------------------------------------------------------------------------------------
// Writer declarations
// -------------------------------------------------------------------------------------------------

/// Branch selection patterns for the external writer.
///
/// A pattern starting with `!` suppresses the matching branch, e.g. `"!electrons.tauDecay"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchList(Vec<String>);

impl BranchList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pattern: impl Into<String>) {
        self.0.push(pattern.into());
    }

    /// Suppress `<object>.<field>`.
    pub fn exclude(&mut self, object: &str, field: &str) {
        self.push(format!("!{object}.{field}"));
    }

    pub fn is_excluded(&self, branch: &str) -> bool {
        self.0
            .iter()
            .any(|p| p.strip_prefix('!') == Some(branch))
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelEntry {
    pub index: usize,
    pub label: String,
}

/// Fixed index → label table written once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelTable {
    pub name: String,
    pub entries: Vec<LabelEntry>,
}

impl LabelTable {
    pub fn new<I, S>(name: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelTable {
            name: name.to_string(),
            entries: labels
                .into_iter()
                .enumerate()
                .map(|(index, label)| LabelEntry {
                    index,
                    label: label.into(),
                })
                .collect(),
        }
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.label.as_str())
    }
}

/// Run-level auxiliary output, independent of the per-event records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    pub tables: Vec<LabelTable>,
}

impl RunMetadata {
    pub fn add_table(&mut self, table: LabelTable) {
        self.tables.push(table);
    }

    pub fn table(&self, name: &str) -> Option<&LabelTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn to_toml_string(&self) -> Result<String, FillError> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod test_output {
    use super::*;

    fn electron(pt: f64) -> PElectron {
        PElectron {
            pt,
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_returns_permutation() {
        let mut collection = Collection::new();
        for pt in [20., 55., 10., 80.] {
            collection.push(electron(pt));
        }
        let before = collection.clone();

        let original = collection.sort_by(pt_greater);

        assert_eq!(original, vec![3, 1, 0, 2]);
        for (a, b) in collection.iter().tuple_windows() {
            assert!(a.pt >= b.pt);
        }
        for (i, &old) in original.iter().enumerate() {
            assert_eq!(collection[i], before[old]);
        }
    }

    #[test]
    fn test_sort_ties_keep_original_order() {
        let mut collection = Collection::new();
        for pt in [30., 50., 30., 30.] {
            collection.push(electron(pt));
        }
        let original = collection.sort_by(pt_greater);
        assert_eq!(original, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_create_back() {
        let mut collection: Collection<PSuperCluster> = Collection::new();
        collection.create_back().raw_pt = 4.;
        collection.create_back().raw_pt = 9.;
        assert_eq!(collection.len(), 2);
        assert_eq!(collection[1].raw_pt, 9.);
    }

    #[test]
    fn test_branch_list() {
        let mut branches = BranchList::new();
        branches.exclude("electrons", "tauDecay");
        assert!(branches.is_excluded("electrons.tauDecay"));
        assert!(!branches.is_excluded("electrons.pt"));
        assert_eq!(branches.patterns(), ["!electrons.tauDecay"]);
    }

    #[test]
    fn test_run_metadata_toml() {
        let mut run = RunMetadata::default();
        run.add_table(LabelTable::new("Buckets", ["first", "second"]));

        let rendered = run.to_toml_string().unwrap();
        assert!(rendered.contains("name = \"Buckets\""));
        assert!(rendered.contains("label = \"second\""));
        assert_eq!(run.table("Buckets").unwrap().label(1), Some("second"));
    }
}
