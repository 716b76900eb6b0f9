//! # Run configuration
//!
//! The configuration is read once, before any event, from a TOML file. Option names
//! follow the upstream conventions (`combIsoEA`, `hltFilters`, `minPt`…).
//!
//! ```toml
//! [common]
//! useTrigger = true
//! triggerObjects = "selectedPatTrigger"
//!
//! [rho]
//! rho = "fixedGridRhoFastjetAll"
//! rhoCentralCalo = "fixedGridRhoFastjetCentralCalo"
//!
//! [fillers.superClusters]
//! superClusters = "reducedSuperClusters"
//!
//! [fillers.photons]
//! photons = "slimmedPhotons"
//! chIso = "photonChIso"
//! nhIso = "photonNhIso"
//! phIso = "photonPhIso"
//! chIsoEA = "effective_areas/photon_ch.txt"
//! nhIsoEA = "effective_areas/photon_nh.txt"
//! phIsoEA = "effective_areas/photon_ph.txt"
//!
//! [fillers.electrons]
//! electrons = "slimmedElectrons"
//! vetoId = "cutBasedElectronID-veto"
//! # ...
//! minPt = 10.0
//! hltFilters = ["hltEle23...", "..."]
//! ```
//!
//! Effective-area paths are relative to the directory holding the configuration file.
//! Value labels (`electrons`, `vetoId`, `rho`…) name products of the input event.
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::{
    constants::{DEFAULT_MAX_ETA, DEFAULT_MIN_PT},
    fill_errors::FillError,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    #[serde(default)]
    pub common: CommonConfig,
    pub rho: RhoConfig,
    #[serde(default)]
    pub fillers: FillersConfig,

    #[serde(skip)]
    base_dir: Utf8PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonConfig {
    #[serde(default = "default_use_trigger")]
    pub use_trigger: bool,
    #[serde(default)]
    pub trigger_objects: Option<String>,
}

impl Default for CommonConfig {
    fn default() -> Self {
        CommonConfig {
            use_trigger: default_use_trigger(),
            trigger_objects: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RhoConfig {
    pub rho: String,
    pub rho_central_calo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillersConfig {
    pub super_clusters: Option<SuperClustersConfig>,
    pub photons: Option<PhotonsConfig>,
    pub electrons: Option<ElectronsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperClustersConfig {
    pub super_clusters: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotonsConfig {
    pub photons: String,
    pub ch_iso: String,
    pub nh_iso: String,
    pub ph_iso: String,
    #[serde(rename = "chIsoEA")]
    pub ch_iso_ea: Utf8PathBuf,
    #[serde(rename = "nhIsoEA")]
    pub nh_iso_ea: Utf8PathBuf,
    #[serde(rename = "phIsoEA")]
    pub ph_iso_ea: Utf8PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectronsConfig {
    pub electrons: String,
    pub veto_id: String,
    pub loose_id: String,
    pub medium_id: String,
    pub tight_id: String,
    #[serde(default)]
    pub ecal_iso: Option<String>,
    #[serde(default)]
    pub hcal_iso: Option<String>,
    #[serde(rename = "combIsoEA")]
    pub comb_iso_ea: Utf8PathBuf,
    #[serde(rename = "ecalIsoEA")]
    pub ecal_iso_ea: Utf8PathBuf,
    #[serde(rename = "hcalIsoEA")]
    pub hcal_iso_ea: Utf8PathBuf,
    #[serde(default = "default_min_pt")]
    pub min_pt: f64,
    #[serde(default = "default_max_eta")]
    pub max_eta: f64,
    #[serde(default)]
    pub hlt_filters: Option<Vec<String>>,
}

fn default_use_trigger() -> bool {
    true
}

fn default_min_pt() -> f64 {
    DEFAULT_MIN_PT
}

fn default_max_eta() -> f64 {
    DEFAULT_MAX_ETA
}

impl RunConfig {
    /// Read a configuration file. Relative paths inside it resolve against its directory.
    pub fn from_file(path: &Utf8Path) -> Result<Self, FillError> {
        let content = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or(Utf8Path::new("")).to_path_buf();
        Ok(Self::from_toml(&content)?.with_base_dir(base_dir))
    }

    /// Parse a configuration from TOML text. Relative paths resolve against the working
    /// directory unless [`RunConfig::with_base_dir`] is applied.
    pub fn from_toml(content: &str) -> Result<Self, FillError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<Utf8PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    /// Resolve a resource path against the configuration directory.
    pub fn resolve_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Label of the trigger-object collection when trigger matching is enabled.
    pub fn trigger_objects(&self) -> Result<&str, FillError> {
        self.common.trigger_objects.as_deref().ok_or_else(|| {
            FillError::configuration("common.triggerObjects", "required when useTrigger is set")
        })
    }

    pub fn photons(&self) -> Result<&PhotonsConfig, FillError> {
        self.fillers
            .photons
            .as_ref()
            .ok_or_else(|| FillError::configuration("fillers.photons", "section missing"))
    }
}
