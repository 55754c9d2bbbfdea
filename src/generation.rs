use std::collections::HashSet;

use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tensor_graph::Graph;

use crate::{Result, configs::GeneratorConfig, mobilenet::MobileNetV1, record::LayerLog};

/// One generated architecture.
#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    pub signature: String,
    pub layers: LayerLog,
    /// Amount of nodes in the architecture's graph.
    pub nodes: usize,
    /// Amount of parameters in the architecture's graph.
    pub params: usize,
}

/// Draws `cfg.count` architectures, each built in its own graph.
///
/// Every draw shares one rng, seeded from `cfg.arch.seed` when present. Draws whose signature
/// was already generated are skipped, so fewer than `cfg.count` architectures may come back.
pub fn generate(cfg: &GeneratorConfig) -> Result<Vec<Generated>> {
    let mut rng = match cfg.arch.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let mut seen = HashSet::new();
    let mut generated = Vec::with_capacity(cfg.count);

    for i in 0..cfg.count {
        let mut graph = Graph::new();
        let input = graph.placeholder("input", &cfg.input_shape)?;
        let net = MobileNetV1::new(&mut graph, &input, &cfg.arch, &mut rng)?;

        if !seen.insert(net.signature().to_string()) {
            debug!("draw {i} repeats {}, skipping", net.signature());
            continue;
        }

        generated.push(Generated {
            signature: net.signature().to_string(),
            nodes: graph.len(),
            params: graph.size(),
            layers: net.into_layers(),
        });
    }

    info!(
        "generated {} unique architecture(s) out of {} draw(s)",
        generated.len(),
        cfg.count
    );
    Ok(generated)
}
