mod builder;
mod stages;

pub use builder::build;
pub use stages::{
    BASE_CHANNELS, BASE_KERNELS, Block, REPEATS, STRIDES, StagePlan, block_schedule,
};

use log::info;
use rand::Rng;
use tensor_graph::{Graph, Tensor};

use crate::{Result, configs::ArchConfig, record::LayerLog};

/// A MobileNetV1 added to a graph, along with the plan it was built from and its layer log.
#[derive(Debug, Clone)]
pub struct MobileNetV1 {
    out: Tensor,
    layers: LayerLog,
    plan: StagePlan,
    signature: String,
}

impl MobileNetV1 {
    /// Resolves the stage plan of `cfg` and builds the network over `input`.
    ///
    /// # Arguments
    /// * `graph` - The graph to add the network to.
    /// * `input` - An NHWC input of `graph`.
    /// * `cfg` - The architecture's configuration.
    /// * `rng` - The source of the sampled stages, drawn from even when `cfg.sample` is unset.
    pub fn new<R: Rng + ?Sized>(
        graph: &mut Graph,
        input: &Tensor,
        cfg: &ArchConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let plan = StagePlan::from_config(cfg, rng);
        Self::with_plan(graph, input, plan, cfg.n_classes)
    }

    /// Builds the network from an explicit plan.
    pub fn with_plan(
        graph: &mut Graph,
        input: &Tensor,
        plan: StagePlan,
        n_classes: usize,
    ) -> Result<Self> {
        let signature = plan.signature();
        let (out, layers) = build(graph, input, &plan, n_classes)?;
        info!("built mobilenetv1 {signature}");

        Ok(Self {
            out,
            layers,
            plan,
            signature,
        })
    }

    /// The classifier's output.
    pub fn out(&self) -> &Tensor {
        &self.out
    }

    pub fn layers(&self) -> &LayerLog {
        &self.layers
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn into_layers(self) -> LayerLog {
        self.layers
    }
}
