//! # Input event
//!
//! Read-only view of one upstream event. Collections and per-event scalars are stored
//! as *products* under string labels, and fillers fetch them through typed [`Token`]s
//! built once from the configuration.
//!
//! ```text
//! InputEvent
//! ├── is_real_data
//! └── products: label → Box<dyn Any>
//!       ├── "slimmedElectrons"         Vec<InputElectron>
//!       ├── "slimmedPhotons"           Vec<InputPhoton>
//!       ├── "vetoId"                   ValueMap<ElectronId, bool>
//!       ├── "fixedGridRhoFastjetAll"   f64
//!       └── ...
//! ```
//!
//! An optional input that was not configured is represented by an *uninitialized*
//! token; fetching through it is a caller error, so fillers test
//! [`Token::is_uninitialized`] first.
use std::{any::Any, collections::HashMap, hash::Hash, marker::PhantomData};

use ahash::RandomState;

use crate::{fill_errors::FillError, kinematics::Momentum};

// -------------------------------------------------------------------------------------------------
// Identities
// -------------------------------------------------------------------------------------------------

/// Position of an electron in its input collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElectronId(pub usize);

/// Position of a photon in its input collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotonId(pub usize);

/// Position of a super cluster in its input collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuperClusterId(pub usize);

/// Numeric key of an identity, used in error messages.
pub trait Key {
    fn key(&self) -> usize;
}

impl Key for ElectronId {
    fn key(&self) -> usize {
        self.0
    }
}

impl Key for PhotonId {
    fn key(&self) -> usize {
        self.0
    }
}

impl Key for SuperClusterId {
    fn key(&self) -> usize {
        self.0
    }
}

// -------------------------------------------------------------------------------------------------
// Input objects
// -------------------------------------------------------------------------------------------------

/// Reference to the super cluster shared by electrons and photons.
///
/// Two references designate the same cluster when their `id` are equal; `eta` is a
/// cached copy of the cluster pseudorapidity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuperClusterRef {
    pub id: SuperClusterId,
    pub eta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PfIsolation {
    pub sum_charged_hadron_pt: f64,
    pub sum_neutral_hadron_et: f64,
    pub sum_photon_et: f64,
    pub sum_pu_pt: f64,
}

/// Where the calorimeter-cluster isolations of an electron come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElectronKind {
    /// Analysis-level electron carrying its own PF cluster isolations.
    Composed {
        ecal_pf_cluster_iso: f64,
        hcal_pf_cluster_iso: f64,
    },
    /// Reconstruction-level electron; isolations come from the `ecalIso`/`hcalIso` maps.
    Bare,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputElectron {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub charge: i32,
    pub full5x5_sigma_ieta_ieta: f64,
    pub full5x5_sigma_iphi_iphi: f64,
    pub hadronic_over_em: f64,
    pub pf_isolation: PfIsolation,
    pub super_cluster: SuperClusterRef,
    pub kind: ElectronKind,
}

impl Momentum for InputElectron {
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

#[derive(Debug, Clone, PartialEq)]
pub struct InputPhoton {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub super_cluster: SuperClusterRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperCluster {
    pub raw_energy: f64,
    pub eta: f64,
    pub phi: f64,
}

impl SuperCluster {
    pub fn raw_pt(&self) -> f64 {
        self.raw_energy / self.eta.cosh()
    }
}

// -------------------------------------------------------------------------------------------------
// Value maps
// -------------------------------------------------------------------------------------------------

/// Per-object values keyed by input identity (identification flags, isolation sums…).
#[derive(Debug, Clone)]
pub struct ValueMap<K, V> {
    values: HashMap<K, V, RandomState>,
}

impl<K: Eq + Hash, V> Default for ValueMap<K, V> {
    fn default() -> Self {
        ValueMap {
            values: HashMap::default(),
        }
    }
}

impl<K: Eq + Hash + Key, V: Copy> ValueMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.values.insert(key, value);
    }

    /// Value for `key`, or [`FillError::MissingValue`] naming `map`.
    pub fn value(&self, map: &str, key: K) -> Result<V, FillError> {
        self.values
            .get(&key)
            .copied()
            .ok_or_else(|| FillError::MissingValue {
                map: map.to_string(),
                key: key.key(),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for ValueMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ValueMap {
            values: iter.into_iter().collect(),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tokens and the product store
// -------------------------------------------------------------------------------------------------

/// Typed handle on an event product.
#[derive(Debug)]
pub struct Token<T> {
    label: Option<String>,
    _product: PhantomData<fn() -> T>,
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        Token {
            label: self.label.clone(),
            _product: PhantomData,
        }
    }
}

impl<T> Token<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Token {
            label: Some(label.into()),
            _product: PhantomData,
        }
    }

    pub fn uninitialized() -> Self {
        Token {
            label: None,
            _product: PhantomData,
        }
    }

    /// Token for an optional input: uninitialized when no label is configured.
    pub fn optional(label: Option<&str>) -> Self {
        match label {
            Some(label) => Self::new(label),
            None => Self::uninitialized(),
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        self.label.is_none()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// One upstream event.
#[derive(Debug, Default)]
pub struct InputEvent {
    is_real_data: bool,
    products: HashMap<String, Box<dyn Any + Send + Sync>, RandomState>,
}

impl InputEvent {
    pub fn new(is_real_data: bool) -> Self {
        InputEvent {
            is_real_data,
            products: HashMap::default(),
        }
    }

    pub fn is_real_data(&self) -> bool {
        self.is_real_data
    }

    /// Store a product under `label`, replacing any previous one.
    pub fn put<T: Any + Send + Sync>(&mut self, label: impl Into<String>, product: T) {
        self.products.insert(label.into(), Box::new(product));
    }

    /// Builder form of [`InputEvent::put`].
    pub fn with<T: Any + Send + Sync>(mut self, label: impl Into<String>, product: T) -> Self {
        self.put(label, product);
        self
    }

    /// Fetch a product through its token.
    ///
    /// Return
    /// ----------
    /// * [`FillError::ProductNotFound`] if the token is uninitialized or nothing is stored
    ///   under its label.
    /// * [`FillError::ProductTypeMismatch`] if the stored product is not a `T`.
    pub fn get<T: Any>(&self, token: &Token<T>) -> Result<&T, FillError> {
        let label = token
            .label()
            .ok_or_else(|| FillError::ProductNotFound("<uninitialized token>".to_string()))?;
        self.products
            .get(label)
            .ok_or_else(|| FillError::ProductNotFound(label.to_string()))?
            .downcast_ref::<T>()
            .ok_or_else(|| FillError::ProductTypeMismatch(label.to_string()))
    }

    /// Fetch an optional product: `None` when the token is uninitialized.
    pub fn get_optional<T: Any>(&self, token: &Token<T>) -> Result<Option<&T>, FillError> {
        if token.is_uninitialized() {
            return Ok(None);
        }
        self.get(token).map(Some)
    }
}

#[cfg(test)]
mod test_event {
    use super::*;

    #[test]
    fn test_product_store() {
        let event = InputEvent::new(false)
            .with("rho", 12.5_f64)
            .with("ids", ValueMap::from_iter([(ElectronId(0), true)]));

        assert!(!event.is_real_data());
        assert_eq!(*event.get(&Token::<f64>::new("rho")).unwrap(), 12.5);

        let ids = event
            .get(&Token::<ValueMap<ElectronId, bool>>::new("ids"))
            .unwrap();
        assert_eq!(ids.value("ids", ElectronId(0)), Ok(true));
        assert_eq!(
            ids.value("ids", ElectronId(3)),
            Err(FillError::MissingValue {
                map: "ids".into(),
                key: 3
            })
        );
    }

    #[test]
    fn test_missing_and_mistyped_products() {
        let event = InputEvent::new(true).with("rho", 1.0_f64);

        assert_eq!(
            event.get(&Token::<f64>::new("absent")).unwrap_err(),
            FillError::ProductNotFound("absent".into())
        );
        assert_eq!(
            event.get(&Token::<Vec<InputPhoton>>::new("rho")).unwrap_err(),
            FillError::ProductTypeMismatch("rho".into())
        );
    }

    #[test]
    fn test_optional_token() {
        let event = InputEvent::new(false).with("ecalIso", ValueMap::<ElectronId, f64>::new());

        let unset: Token<ValueMap<ElectronId, f64>> = Token::optional(None);
        assert!(unset.is_uninitialized());
        assert!(event.get_optional(&unset).unwrap().is_none());

        let set: Token<ValueMap<ElectronId, f64>> = Token::optional(Some("ecalIso"));
        assert!(event.get_optional(&set).unwrap().is_some());
    }

    #[test]
    fn test_super_cluster_raw_pt() {
        let sc = SuperCluster {
            raw_energy: 100.,
            eta: 0.,
            phi: 0.,
        };
        assert_eq!(sc.raw_pt(), 100.);
    }
}
