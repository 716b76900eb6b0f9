use tracing::{debug, info};

use crate::{
    config::RunConfig,
    event::{InputEvent, SuperCluster, SuperClusterId, Token},
    fill_errors::FillError,
    filler::Filler,
    object_map::ObjectMapSet,
    output::{pt_greater, OutputEvent, SuperClusterSlot},
};

/// Writes one record per super cluster, sorted by raw pT, and publishes
/// `SuperClusterId ↔ SuperClusterSlot` for fillers referencing clusters.
#[derive(Debug)]
pub struct SuperClustersFiller {
    name: String,
    super_clusters_token: Token<Vec<SuperCluster>>,
}

impl SuperClustersFiller {
    pub fn new(name: &str, config: &RunConfig) -> Result<Self, FillError> {
        let section = config.fillers.super_clusters.as_ref().ok_or_else(|| {
            FillError::configuration("fillers.superClusters", "section missing")
        })?;

        info!(filler = name, source = section.super_clusters.as_str(), "Configured super-cluster filler");

        Ok(SuperClustersFiller {
            name: name.to_string(),
            super_clusters_token: Token::new(section.super_clusters.as_str()),
        })
    }
}

impl Filler for SuperClustersFiller {
    fn name(&self) -> &str {
        &self.name
    }

    fn fill(
        &mut self,
        input: &InputEvent,
        output: &mut OutputEvent,
        maps: &mut ObjectMapSet,
    ) -> Result<(), FillError> {
        let in_super_clusters = input.get(&self.super_clusters_token)?;
        let out_super_clusters = &mut output.super_clusters;

        for in_sc in in_super_clusters {
            let out_sc = out_super_clusters.create_back();
            out_sc.raw_pt = in_sc.raw_pt();
            out_sc.eta = in_sc.eta;
            out_sc.phi = in_sc.phi;
        }

        let original_indices = out_super_clusters.sort_by(pt_greater);

        let sc_map = maps.get_mut::<SuperClusterId, SuperClusterSlot>();
        for (slot, &old) in original_indices.iter().enumerate() {
            sc_map.add(SuperClusterId(old), SuperClusterSlot(slot));
        }

        debug!(filler = self.name.as_str(), emitted = out_super_clusters.len(), "Filled super clusters");

        Ok(())
    }
}

#[cfg(test)]
mod test_super_clusters_filler {
    use super::*;

    #[test]
    fn test_fill_sorted_with_map() {
        let config = RunConfig::from_toml(
            r#"
            [rho]
            rho = "rho"
            rhoCentralCalo = "rhoCentralCalo"

            [fillers.superClusters]
            superClusters = "scs"
            "#,
        )
        .unwrap();
        let mut filler = SuperClustersFiller::new("superClusters", &config).unwrap();

        let input = InputEvent::new(true).with(
            "scs",
            vec![
                SuperCluster {
                    raw_energy: 10.,
                    eta: 0.,
                    phi: 0.1,
                },
                SuperCluster {
                    raw_energy: 50.,
                    eta: 0.,
                    phi: 0.2,
                },
            ],
        );

        let mut output = OutputEvent::default();
        let mut maps = ObjectMapSet::new();
        filler.fill(&input, &mut output, &mut maps).unwrap();

        assert_eq!(output.super_clusters.len(), 2);
        assert_eq!(output.super_clusters[0].raw_pt, 50.);
        let map = maps.get::<SuperClusterId, SuperClusterSlot>().unwrap();
        assert_eq!(map.get_by_source(&SuperClusterId(1)), Some(&SuperClusterSlot(0)));
        assert_eq!(map.get_by_source(&SuperClusterId(0)), Some(&SuperClusterSlot(1)));
    }

    #[test]
    fn test_missing_section() {
        let config = RunConfig::from_toml("[rho]\nrho = \"a\"\nrhoCentralCalo = \"b\"\n").unwrap();
        let err = SuperClustersFiller::new("superClusters", &config).unwrap_err();
        assert!(err.is_configuration());
    }
}
