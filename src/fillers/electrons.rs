//! # Electron filler
//!
//! Selects electrons, derives corrected isolations, links each electron to the photon
//! built from the same super cluster, matches it to the trigger buckets, sorts the
//! output by descending pT and publishes two object maps:
//!
//! - `ElectronId ↔ ElectronSlot`
//! - `SuperClusterId ↔ ElectronSlot`
//!
//! The second one drives the reference-resolution pass: each output electron gets the
//! slot of its super cluster as published by the super-cluster filler.
//!
//! ## Isolation corrections
//!
//! All corrections use the |η| of the electron's super cluster:
//!
//! ```text
//! isoPUOffset = EA_comb(|η_sc|) × ρ
//! ecaliso     = ecalPFClusterIso − EA_ecal(|η_sc|) × ρ_centralCalo
//! hcaliso     = hcalPFClusterIso − EA_hcal(|η_sc|) × ρ_centralCalo
//! chisoPh     = photonChIso      − EA_ph_ch(|η_sc|) × ρ      (same for nh, ph)
//! ```
//!
//! Calorimeter cluster isolations come from the electron itself for
//! [`ElectronKind::Composed`] electrons, and from the `ecalIso`/`hcalIso` value maps for
//! [`ElectronKind::Bare`] ones. A bare electron without those maps is a configuration
//! error that stops the run.
//!
//! When several photons share the electron's super cluster, the last one in collection
//! order wins.
use camino::Utf8Path;
use tracing::{debug, info, trace};

use crate::{
    config::{ElectronsConfig, RunConfig},
    constants::SUPER_CLUSTERS_FILLER,
    effective_area::EffectiveAreaTable,
    event::{
        ElectronId, ElectronKind, InputElectron, InputEvent, InputPhoton, PhotonId,
        SuperClusterId, Token, ValueMap,
    },
    fill_errors::FillError,
    filler::Filler,
    object_map::{ObjectMapSet, ObjectMapStore},
    output::{
        pt_greater, BranchList, ElectronSlot, OutputEvent, PElectron, RunMetadata,
        SuperClusterSlot,
    },
    trigger::{electron_hlt_label_table, TriggerBuckets, TriggerMatcher, TriggerObject},
};

type IdMap = ValueMap<ElectronId, bool>;
type ElectronIsoMap = ValueMap<ElectronId, f64>;
type PhotonIsoMap = ValueMap<PhotonId, f64>;

/// The six effective-area tables used by the electron filler.
#[derive(Debug, Clone)]
pub struct ElectronEffectiveAreas {
    pub comb_iso: EffectiveAreaTable,
    pub ecal_iso: EffectiveAreaTable,
    pub hcal_iso: EffectiveAreaTable,
    pub photon_ch_iso: EffectiveAreaTable,
    pub photon_nh_iso: EffectiveAreaTable,
    pub photon_ph_iso: EffectiveAreaTable,
}

impl ElectronEffectiveAreas {
    /// Load every table named in the `electrons` and `photons` sections.
    pub fn load(config: &RunConfig) -> Result<Self, FillError> {
        let electrons = electrons_config(config)?;
        let photons = config.photons()?;
        let load = |path: &Utf8Path| EffectiveAreaTable::from_file(&config.resolve_path(path));

        Ok(ElectronEffectiveAreas {
            comb_iso: load(electrons.comb_iso_ea.as_path())?,
            ecal_iso: load(electrons.ecal_iso_ea.as_path())?,
            hcal_iso: load(electrons.hcal_iso_ea.as_path())?,
            photon_ch_iso: load(photons.ch_iso_ea.as_path())?,
            photon_nh_iso: load(photons.nh_iso_ea.as_path())?,
            photon_ph_iso: load(photons.ph_iso_ea.as_path())?,
        })
    }
}

fn electrons_config(config: &RunConfig) -> Result<&ElectronsConfig, FillError> {
    config
        .fillers
        .electrons
        .as_ref()
        .ok_or_else(|| FillError::configuration("fillers.electrons", "section missing"))
}

#[derive(Debug)]
pub struct ElectronsFiller {
    name: String,

    electrons_token: Token<Vec<InputElectron>>,
    photons_token: Token<Vec<InputPhoton>>,
    veto_id_token: Token<IdMap>,
    loose_id_token: Token<IdMap>,
    medium_id_token: Token<IdMap>,
    tight_id_token: Token<IdMap>,
    ph_ch_iso_token: Token<PhotonIsoMap>,
    ph_nh_iso_token: Token<PhotonIsoMap>,
    ph_ph_iso_token: Token<PhotonIsoMap>,
    ecal_iso_token: Token<ElectronIsoMap>,
    hcal_iso_token: Token<ElectronIsoMap>,
    rho_token: Token<f64>,
    rho_central_calo_token: Token<f64>,
    trigger_objects_token: Token<Vec<TriggerObject>>,

    trigger: Option<TriggerMatcher>,
    effective_areas: ElectronEffectiveAreas,
    min_pt: f64,
    max_eta: f64,
    super_clusters_filler: String,
}

impl ElectronsFiller {
    /// Build the filler, loading effective-area tables from disk.
    pub fn new(name: &str, config: &RunConfig) -> Result<Self, FillError> {
        let effective_areas = ElectronEffectiveAreas::load(config)?;
        Self::with_effective_areas(name, config, effective_areas)
    }

    /// Build the filler with already loaded effective-area tables.
    ///
    /// Arguments
    /// -----------------
    /// * `name`: key of the published object maps.
    /// * `config`: the run configuration; the `electrons` and `photons` filler sections,
    ///   `rho` and `common` are read.
    /// * `effective_areas`: correction tables.
    ///
    /// Return
    /// ----------
    /// * A [`FillError::Configuration`] if a section is missing, or if trigger matching is
    ///   enabled and `hltFilters` is absent or does not have one label per bucket.
    pub fn with_effective_areas(
        name: &str,
        config: &RunConfig,
        effective_areas: ElectronEffectiveAreas,
    ) -> Result<Self, FillError> {
        let electrons = electrons_config(config)?;
        let photons = config.photons()?;

        let (trigger, trigger_objects_token) = if config.common.use_trigger {
            let filters = electrons.hlt_filters.clone().ok_or_else(|| {
                FillError::configuration("hltFilters", "required when useTrigger is set")
            })?;
            (
                Some(TriggerMatcher::new(filters)?),
                Token::new(config.trigger_objects()?),
            )
        } else {
            (None, Token::uninitialized())
        };

        info!(
            filler = name,
            min_pt = electrons.min_pt,
            max_eta = electrons.max_eta,
            use_trigger = trigger.is_some(),
            "Configured electron filler"
        );

        Ok(ElectronsFiller {
            name: name.to_string(),
            electrons_token: Token::new(electrons.electrons.as_str()),
            photons_token: Token::new(photons.photons.as_str()),
            veto_id_token: Token::new(electrons.veto_id.as_str()),
            loose_id_token: Token::new(electrons.loose_id.as_str()),
            medium_id_token: Token::new(electrons.medium_id.as_str()),
            tight_id_token: Token::new(electrons.tight_id.as_str()),
            ph_ch_iso_token: Token::new(photons.ch_iso.as_str()),
            ph_nh_iso_token: Token::new(photons.nh_iso.as_str()),
            ph_ph_iso_token: Token::new(photons.ph_iso.as_str()),
            ecal_iso_token: Token::optional(electrons.ecal_iso.as_deref()),
            hcal_iso_token: Token::optional(electrons.hcal_iso.as_deref()),
            rho_token: Token::new(config.rho.rho.as_str()),
            rho_central_calo_token: Token::new(config.rho.rho_central_calo.as_str()),
            trigger_objects_token,
            trigger,
            effective_areas,
            min_pt: electrons.min_pt,
            max_eta: electrons.max_eta,
            super_clusters_filler: SUPER_CLUSTERS_FILLER.to_string(),
        })
    }

    pub fn use_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    fn passes_kinematics(&self, electron: &InputElectron) -> bool {
        electron.pt >= self.min_pt && electron.eta.abs() <= self.max_eta
    }

    /// ECAL and HCAL PF cluster isolations before pileup subtraction.
    fn raw_calo_isolations(
        &self,
        electron: &InputElectron,
        id: ElectronId,
        ecal_iso: Option<&ElectronIsoMap>,
        hcal_iso: Option<&ElectronIsoMap>,
    ) -> Result<(f64, f64), FillError> {
        match electron.kind {
            ElectronKind::Composed {
                ecal_pf_cluster_iso,
                hcal_pf_cluster_iso,
            } => Ok((ecal_pf_cluster_iso, hcal_pf_cluster_iso)),
            ElectronKind::Bare => {
                let ecal = ecal_iso
                    .ok_or_else(|| {
                        FillError::configuration("ecalIso", "ECAL PF cluster iso missing")
                    })?
                    .value(self.ecal_iso_token.label().unwrap_or("ecalIso"), id)?;
                let hcal = hcal_iso
                    .ok_or_else(|| {
                        FillError::configuration("hcalIso", "HCAL PF cluster iso missing")
                    })?
                    .value(self.hcal_iso_token.label().unwrap_or("hcalIso"), id)?;
                Ok((ecal, hcal))
            }
        }
    }
}

/// Products of one event, fetched once before the candidate loop.
struct EventProducts<'a> {
    electrons: &'a [InputElectron],
    photons: &'a [InputPhoton],
    veto_id: &'a IdMap,
    loose_id: &'a IdMap,
    medium_id: &'a IdMap,
    tight_id: &'a IdMap,
    ph_ch_iso: &'a PhotonIsoMap,
    ph_nh_iso: &'a PhotonIsoMap,
    ph_ph_iso: &'a PhotonIsoMap,
    ecal_iso: Option<&'a ElectronIsoMap>,
    hcal_iso: Option<&'a ElectronIsoMap>,
    rho: f64,
    rho_central_calo: f64,
    hlt_buckets: TriggerBuckets<'a>,
}

impl ElectronsFiller {
    fn products<'a>(&self, input: &'a InputEvent) -> Result<EventProducts<'a>, FillError> {
        let hlt_buckets = match &self.trigger {
            Some(matcher) => matcher.partition(input.get(&self.trigger_objects_token)?),
            None => TriggerBuckets::default(),
        };

        Ok(EventProducts {
            electrons: input.get(&self.electrons_token)?,
            photons: input.get(&self.photons_token)?,
            veto_id: input.get(&self.veto_id_token)?,
            loose_id: input.get(&self.loose_id_token)?,
            medium_id: input.get(&self.medium_id_token)?,
            tight_id: input.get(&self.tight_id_token)?,
            ph_ch_iso: input.get(&self.ph_ch_iso_token)?,
            ph_nh_iso: input.get(&self.ph_nh_iso_token)?,
            ph_ph_iso: input.get(&self.ph_ph_iso_token)?,
            ecal_iso: input.get_optional(&self.ecal_iso_token)?,
            hcal_iso: input.get_optional(&self.hcal_iso_token)?,
            rho: *input.get(&self.rho_token)?,
            rho_central_calo: *input.get(&self.rho_central_calo_token)?,
            hlt_buckets,
        })
    }

    fn label<T>(token: &Token<T>) -> &str {
        token.label().unwrap_or_default()
    }
}

impl Filler for ElectronsFiller {
    fn name(&self) -> &str {
        &self.name
    }

    fn fill(
        &mut self,
        input: &InputEvent,
        output: &mut OutputEvent,
        maps: &mut ObjectMapSet,
    ) -> Result<(), FillError> {
        let products = self.products(input)?;
        let ea = &self.effective_areas;
        let out_electrons = &mut output.electrons;

        // input identity of each emitted record, in emission order
        let mut sources: Vec<ElectronId> = Vec::new();

        for (index, in_electron) in products.electrons.iter().enumerate() {
            if !self.passes_kinematics(in_electron) {
                trace!(index, pt = in_electron.pt, eta = in_electron.eta, "Electron fails kinematic cuts");
                continue;
            }

            let id = ElectronId(index);
            let veto = products
                .veto_id
                .value(Self::label(&self.veto_id_token), id)?;
            if !veto {
                trace!(index, "Electron fails veto identification");
                continue;
            }

            let sc_ref = in_electron.super_cluster;
            let sc_eta = sc_ref.eta.abs();

            let (raw_ecal_iso, raw_hcal_iso) =
                self.raw_calo_isolations(in_electron, id, products.ecal_iso, products.hcal_iso)?;

            let out_electron = out_electrons.create_back();
            out_electron.fill_p4(in_electron);

            out_electron.veto = veto;
            out_electron.loose = products
                .loose_id
                .value(Self::label(&self.loose_id_token), id)?;
            out_electron.medium = products
                .medium_id
                .value(Self::label(&self.medium_id_token), id)?;
            out_electron.tight = products
                .tight_id
                .value(Self::label(&self.tight_id_token), id)?;

            out_electron.charge = in_electron.charge;

            out_electron.sieie = in_electron.full5x5_sigma_ieta_ieta;
            out_electron.sipip = in_electron.full5x5_sigma_iphi_iphi;
            out_electron.h_over_e = in_electron.hadronic_over_em;

            let pf_iso = &in_electron.pf_isolation;
            out_electron.chiso = pf_iso.sum_charged_hadron_pt;
            out_electron.nhiso = pf_iso.sum_neutral_hadron_et;
            out_electron.phoiso = pf_iso.sum_photon_et;
            out_electron.puiso = pf_iso.sum_pu_pt;
            out_electron.iso_pu_offset = ea.comb_iso.lookup(sc_eta) * products.rho;

            out_electron.ecaliso = raw_ecal_iso - ea.ecal_iso.lookup(sc_eta) * products.rho_central_calo;
            out_electron.hcaliso = raw_hcal_iso - ea.hcal_iso.lookup(sc_eta) * products.rho_central_calo;

            for (ph_index, photon) in products.photons.iter().enumerate() {
                if photon.super_cluster.id != sc_ref.id {
                    continue;
                }
                let ph_id = PhotonId(ph_index);
                out_electron.chiso_ph = products
                    .ph_ch_iso
                    .value(Self::label(&self.ph_ch_iso_token), ph_id)?
                    - ea.photon_ch_iso.lookup(sc_eta) * products.rho;
                out_electron.nhiso_ph = products
                    .ph_nh_iso
                    .value(Self::label(&self.ph_nh_iso_token), ph_id)?
                    - ea.photon_nh_iso.lookup(sc_eta) * products.rho;
                out_electron.phiso_ph = products
                    .ph_ph_iso
                    .value(Self::label(&self.ph_ph_iso_token), ph_id)?
                    - ea.photon_ph_iso.lookup(sc_eta) * products.rho;
            }

            if self.trigger.is_some() {
                out_electron.match_hlt = products.hlt_buckets.matches(in_electron);
            }

            if !input.is_real_data() {
                out_electron.tau_decay = Some(false);
                out_electron.had_decay = Some(false);
            }

            sources.push(id);
        }

        let original_indices = out_electrons.sort_by(pt_greater);

        let ele_ele_map = maps.get_mut::<ElectronId, ElectronSlot>();
        for (slot, &old) in original_indices.iter().enumerate() {
            ele_ele_map.add(sources[old], ElectronSlot(slot));
        }

        let sc_ele_map = maps.get_mut::<SuperClusterId, ElectronSlot>();
        for (slot, &old) in original_indices.iter().enumerate() {
            let sc_id = products.electrons[sources[old].0].super_cluster.id;
            sc_ele_map.add(sc_id, ElectronSlot(slot));
        }

        debug!(
            filler = self.name.as_str(),
            input = products.electrons.len(),
            emitted = out_electrons.len(),
            "Filled electrons"
        );

        Ok(())
    }

    fn set_refs(&self, maps: &ObjectMapStore, output: &mut OutputEvent) -> Result<(), FillError> {
        let sc_ele_map = maps.map::<SuperClusterId, ElectronSlot>(&self.name)?;
        let sc_map = maps.map::<SuperClusterId, SuperClusterSlot>(&self.super_clusters_filler)?;

        for (slot, sc_id) in sc_ele_map.bwd() {
            let sc_slot =
                sc_map
                    .get_by_source(sc_id)
                    .ok_or_else(|| FillError::UnresolvedReference {
                        map: self.super_clusters_filler.clone(),
                        key: sc_id.0,
                    })?;
            let out_electron =
                output
                    .electrons
                    .get_mut(slot.0)
                    .ok_or_else(|| FillError::UnresolvedReference {
                        map: self.name.clone(),
                        key: slot.0,
                    })?;
            out_electron.super_cluster = Some(*sc_slot);
        }

        Ok(())
    }

    fn branch_names(&self, is_real_data: bool, event_branches: &mut BranchList) {
        if is_real_data {
            for branch in ["tauDecay", "hadDecay", "matchedGen_"] {
                event_branches.exclude(&self.name, branch);
            }
        }
        if !self.use_trigger() {
            event_branches.exclude(&self.name, "matchHLT");
        }
    }

    fn add_output(&self, run: &mut RunMetadata) {
        run.add_table(electron_hlt_label_table());
    }
}
