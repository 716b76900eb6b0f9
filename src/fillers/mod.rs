//! Concrete fillers.
//!
//! * [`electrons::ElectronsFiller`] – electron selection, isolation corrections,
//!   photon and trigger cross-matching.
//! * [`super_clusters::SuperClustersFiller`] – super-cluster records, the target of the
//!   electron super-cluster references.
pub mod electrons;
pub mod super_clusters;
