//! # Two-pass event pipeline
//!
//! [`FillerPipeline`] owns the fillers and the per-event [`ObjectMapStore`]. For each
//! event it:
//!
//! 1. clears every object map, so nothing leaks from the previous event,
//! 2. runs [`Filler::fill`] on every filler, in registration order,
//! 3. runs [`Filler::set_refs`] on every filler, once all fills are done,
//!
//! and returns the finished [`OutputEvent`]. The first error aborts the event and is
//! returned to the caller, which is expected to stop the run.
//!
//! A pipeline holds mutable per-event state: run events in parallel with one pipeline
//! per worker.
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use ntuplefill::{config::RunConfig, event::InputEvent, pipeline::FillerPipeline};
//!
//! let config = RunConfig::from_file(Utf8Path::new("data/fillers.toml"))?;
//! let mut pipeline = FillerPipeline::from_config(&config)?;
//! let metadata = pipeline.run_metadata();
//!
//! let event = InputEvent::new(false); // products filled by the upstream reader
//! let output = pipeline.process(&event)?;
//! # Ok::<(), ntuplefill::fill_errors::FillError>(())
//! ```
use tracing::{debug, info};

use crate::{
    config::RunConfig,
    constants::{ELECTRONS_FILLER, SUPER_CLUSTERS_FILLER},
    event::InputEvent,
    fill_errors::FillError,
    filler::Filler,
    fillers::{electrons::ElectronsFiller, super_clusters::SuperClustersFiller},
    object_map::ObjectMapStore,
    output::{BranchList, OutputEvent, RunMetadata},
};

#[derive(Default)]
pub struct FillerPipeline {
    fillers: Vec<Box<dyn Filler>>,
    object_maps: ObjectMapStore,
}

impl FillerPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the fillers configured in `config`.
    ///
    /// The super-cluster filler is registered first; the electron filler requires it
    /// because its references point into the super-cluster collection.
    pub fn from_config(config: &RunConfig) -> Result<Self, FillError> {
        let mut pipeline = FillerPipeline::new();

        if config.fillers.super_clusters.is_some() {
            pipeline.add(Box::new(SuperClustersFiller::new(
                SUPER_CLUSTERS_FILLER,
                config,
            )?))?;
        }

        if config.fillers.electrons.is_some() {
            if config.fillers.super_clusters.is_none() {
                return Err(FillError::configuration(
                    "fillers.superClusters",
                    "required by the electrons filler",
                ));
            }
            pipeline.add(Box::new(ElectronsFiller::new(ELECTRONS_FILLER, config)?))?;
        }

        info!(fillers = pipeline.fillers.len(), "Configured filler pipeline");
        Ok(pipeline)
    }

    /// Register a filler. Names must be unique since they key the object maps.
    pub fn add(&mut self, filler: Box<dyn Filler>) -> Result<(), FillError> {
        if self.fillers.iter().any(|f| f.name() == filler.name()) {
            return Err(FillError::configuration(
                filler.name(),
                "filler name registered twice",
            ));
        }
        self.fillers.push(filler);
        Ok(())
    }

    pub fn filler_names(&self) -> impl Iterator<Item = &str> {
        self.fillers.iter().map(|f| f.name())
    }

    /// Run both passes on one event.
    pub fn process(&mut self, input: &InputEvent) -> Result<OutputEvent, FillError> {
        self.object_maps.clear();
        let mut output = OutputEvent::default();

        for filler in self.fillers.iter_mut() {
            let maps = self.object_maps.entry(filler.name());
            filler.fill(input, &mut output, maps)?;
        }

        for filler in &self.fillers {
            filler.set_refs(&self.object_maps, &mut output)?;
        }

        debug!(
            electrons = output.electrons.len(),
            super_clusters = output.super_clusters.len(),
            "Processed event"
        );

        Ok(output)
    }

    /// Object maps of the last processed event.
    pub fn object_maps(&self) -> &ObjectMapStore {
        &self.object_maps
    }

    /// Branches the writer must drop for this kind of data.
    pub fn branch_list(&self, is_real_data: bool) -> BranchList {
        let mut branches = BranchList::new();
        for filler in &self.fillers {
            filler.branch_names(is_real_data, &mut branches);
        }
        branches
    }

    /// Run-level tables, written once alongside the event output.
    pub fn run_metadata(&self) -> RunMetadata {
        let mut run = RunMetadata::default();
        for filler in &self.fillers {
            filler.add_output(&mut run);
        }
        run
    }
}
