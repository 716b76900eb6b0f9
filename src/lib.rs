//! # ntuplefill
//!
//! Per-event object enrichment and cross-collection linking for flat physics ntuples.
//!
//! For every event, fillers read upstream collections, select candidates, derive
//! pileup-corrected quantities, match them against sibling collections and trigger
//! objects, and write compact sorted output collections. Each filler also publishes
//! object maps (input identity ↔ output slot) so that, in a second pass, fillers can
//! resolve references into the collections written by other fillers.
//!
//! ## Modules
//!
//! - [`pipeline`] – the two-pass driver ([`pipeline::FillerPipeline`]).
//! - [`filler`] – the [`filler::Filler`] interface.
//! - [`fillers`] – the electron and super-cluster fillers.
//! - [`object_map`] – bidirectional per-event maps between inputs and outputs.
//! - [`effective_area`] – |η|-binned pileup correction tables.
//! - [`trigger`] – trigger-object bucketing and ΔR matching.
//! - [`event`] / [`output`] – input products and output records.
//! - [`config`] – TOML run configuration.
pub mod config;
pub mod constants;
pub mod effective_area;
pub mod event;
pub mod fill_errors;
pub mod filler;
pub mod fillers;
pub mod kinematics;
pub mod object_map;
pub mod output;
pub mod pipeline;
pub mod trigger;

pub use fill_errors::FillError;
pub use pipeline::FillerPipeline;
