#![allow(dead_code)]

use camino::Utf8Path;
use ntuplefill::{
    config::RunConfig,
    event::{
        ElectronId, ElectronKind, InputElectron, InputEvent, InputPhoton, PfIsolation, PhotonId,
        SuperCluster, SuperClusterId, SuperClusterRef, ValueMap,
    },
    trigger::TriggerObject,
};

pub const RHO: f64 = 20.;
pub const RHO_CENTRAL_CALO: f64 = 12.;

pub fn load_config() -> RunConfig {
    RunConfig::from_file(Utf8Path::new("data/fillers.toml")).unwrap()
}

/// The reference configuration, edited as text before parsing.
pub fn edited_config(from: &str, to: &str) -> RunConfig {
    let text = std::fs::read_to_string("data/fillers.toml").unwrap();
    assert!(text.contains(from), "pattern not in config: {from}");
    RunConfig::from_toml(&text.replace(from, to))
        .unwrap()
        .with_base_dir("data")
}

pub fn hlt_filter(index: usize) -> String {
    load_config().fillers.electrons.unwrap().hlt_filters.unwrap()[index].clone()
}

pub fn electron(pt: f64, eta: f64, phi: f64, sc: usize) -> InputElectron {
    InputElectron {
        pt,
        eta,
        phi,
        charge: 1,
        full5x5_sigma_ieta_ieta: 0.0095,
        full5x5_sigma_iphi_iphi: 0.011,
        hadronic_over_em: 0.02,
        pf_isolation: PfIsolation {
            sum_charged_hadron_pt: 0.8,
            sum_neutral_hadron_et: 0.4,
            sum_photon_et: 1.2,
            sum_pu_pt: 3.1,
        },
        super_cluster: SuperClusterRef {
            id: SuperClusterId(sc),
            eta,
        },
        kind: ElectronKind::Composed {
            ecal_pf_cluster_iso: 2.0,
            hcal_pf_cluster_iso: 1.5,
        },
    }
}

pub fn photon(sc: usize, eta: f64) -> InputPhoton {
    InputPhoton {
        pt: 30.,
        eta,
        phi: 0.,
        super_cluster: SuperClusterRef {
            id: SuperClusterId(sc),
            eta,
        },
    }
}

pub fn super_cluster(raw_pt: f64, eta: f64, phi: f64) -> SuperCluster {
    SuperCluster {
        raw_energy: raw_pt * eta.cosh(),
        eta,
        phi,
    }
}

pub fn trigger_object(eta: f64, phi: f64, labels: &[String]) -> TriggerObject {
    TriggerObject {
        pt: 40.,
        eta,
        phi,
        filter_labels: labels.to_vec(),
    }
}

/// Products of one event, stored under the labels of `data/fillers.toml`.
pub struct EventFixture {
    pub is_real_data: bool,
    pub electrons: Vec<InputElectron>,
    pub veto: Vec<bool>,
    pub photons: Vec<InputPhoton>,
    /// (charged, neutral, photon) isolation per photon
    pub photon_iso: Vec<(f64, f64, f64)>,
    pub super_clusters: Vec<SuperCluster>,
    pub trigger_objects: Vec<TriggerObject>,
}

impl EventFixture {
    pub fn new(is_real_data: bool) -> Self {
        EventFixture {
            is_real_data,
            electrons: vec![],
            veto: vec![],
            photons: vec![],
            photon_iso: vec![],
            super_clusters: vec![],
            trigger_objects: vec![],
        }
    }

    pub fn build(self) -> InputEvent {
        let ids = |pass: &dyn Fn(usize) -> bool| -> ValueMap<ElectronId, bool> {
            (0..self.electrons.len())
                .map(|i| (ElectronId(i), self.veto[i] && pass(i)))
                .collect()
        };
        let photon_iso = |pick: fn(&(f64, f64, f64)) -> f64| -> ValueMap<PhotonId, f64> {
            self.photon_iso
                .iter()
                .enumerate()
                .map(|(i, iso)| (PhotonId(i), pick(iso)))
                .collect()
        };

        InputEvent::new(self.is_real_data)
            .with("egmGsfElectronIDs:cutBasedElectronID-veto", ids(&|_| true))
            .with("egmGsfElectronIDs:cutBasedElectronID-loose", ids(&|_| true))
            .with("egmGsfElectronIDs:cutBasedElectronID-medium", ids(&|i| i % 2 == 0))
            .with("egmGsfElectronIDs:cutBasedElectronID-tight", ids(&|_| false))
            .with("photonIDValueMapProducer:phoChargedIsolation", photon_iso(|iso| iso.0))
            .with("photonIDValueMapProducer:phoNeutralHadronIsolation", photon_iso(|iso| iso.1))
            .with("photonIDValueMapProducer:phoPhotonIsolation", photon_iso(|iso| iso.2))
            .with("fixedGridRhoFastjetAll", RHO)
            .with("fixedGridRhoFastjetCentralCalo", RHO_CENTRAL_CALO)
            .with("slimmedElectrons", self.electrons)
            .with("slimmedPhotons", self.photons)
            .with("reducedSuperClusters", self.super_clusters)
            .with("selectedPatTrigger", self.trigger_objects)
    }
}
