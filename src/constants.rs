//! # Constants and shared definitions
//!
//! Selection defaults, matching radii and the fixed list of electron trigger buckets.
//!
//! The trigger bucket list is compile-time fixed: the output record stores one
//! boolean per bucket, and the configured `hltFilters` list must provide exactly one
//! filter label per bucket (see [`TriggerMatcher::new`](crate::trigger::TriggerMatcher::new)).

// -------------------------------------------------------------------------------------------------
// Selection and matching
// -------------------------------------------------------------------------------------------------

/// Default minimum transverse momentum (GeV). Negative means "no cut".
pub const DEFAULT_MIN_PT: f64 = -1.;

/// Default maximum absolute pseudorapidity.
pub const DEFAULT_MAX_ETA: f64 = 10.;

/// Maximum ΔR between a candidate and a trigger object for a match (strict).
pub const HLT_MATCH_DR: f64 = 0.3;

/// Name under which the super-cluster filler publishes its object maps.
pub const SUPER_CLUSTERS_FILLER: &str = "superClusters";

/// Name under which the electron filler publishes its object maps.
pub const ELECTRONS_FILLER: &str = "electrons";

// -------------------------------------------------------------------------------------------------
// Electron trigger buckets
// -------------------------------------------------------------------------------------------------

/// Name of the run-level table mapping bucket index → bucket label.
pub const ELECTRON_HLT_TABLE: &str = "ElectronHLTObject";

/// Human readable bucket labels, indexed like `PElectron::match_hlt`.
pub const ELECTRON_HLT_OBJECT_NAMES: [&str; N_ELECTRON_HLT_OBJECTS] = [
    "El23Loose",
    "El27Loose",
    "El120Ieta",
    "El135Ieta",
    "El27Tight",
    "El32Tight",
    "El35Tight",
    "Ph165HE10",
    "Ph175",
    "Ph200",
];

/// Number of electron trigger buckets.
pub const N_ELECTRON_HLT_OBJECTS: usize = 10;

/// Per-bucket match flags stored on each output electron.
pub type HltMatches = [bool; N_ELECTRON_HLT_OBJECTS];
