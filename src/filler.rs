//! # Filler interface
//!
//! A filler turns one family of input products into one output collection. Every
//! filler takes part in two passes per event, driven by
//! [`FillerPipeline`](crate::pipeline::FillerPipeline):
//!
//! 1. [`Filler::fill`]: select, derive, emit, sort and publish object maps into the
//!    filler's own [`ObjectMapSet`].
//! 2. [`Filler::set_refs`]: once *every* filler has filled, read the maps other fillers
//!    published and write cross-collection references into this filler's records.
//!
//! The second pass only adds references; it never recomputes fields written in the
//! first pass.
use crate::{
    event::InputEvent,
    fill_errors::FillError,
    object_map::{ObjectMapSet, ObjectMapStore},
    output::{BranchList, OutputEvent, RunMetadata},
};

pub trait Filler {
    /// Name of the filler, also the key of its object maps in the [`ObjectMapStore`].
    fn name(&self) -> &str;

    /// First pass: fill this filler's output collection for one event.
    fn fill(
        &mut self,
        input: &InputEvent,
        output: &mut OutputEvent,
        maps: &mut ObjectMapSet,
    ) -> Result<(), FillError>;

    /// Second pass: resolve references to records of other fillers.
    fn set_refs(&self, _maps: &ObjectMapStore, _output: &mut OutputEvent) -> Result<(), FillError> {
        Ok(())
    }

    /// Declare output branches the writer must not persist.
    fn branch_names(&self, _is_real_data: bool, _event_branches: &mut BranchList) {}

    /// Contribute run-level auxiliary tables.
    fn add_output(&self, _run: &mut RunMetadata) {}
}
