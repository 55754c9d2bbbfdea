use log::debug;
use tensor_graph::{ActFn, Graph, Padding, Tensor};

use super::{StagePlan, block_schedule};
use crate::{
    Result,
    record::{LayerLog, LayerRecord, OpKind},
};

/// Channels of the images fed to the stem.
const INPUT_CHANNELS: usize = 3;

/// Builds a MobileNetV1 over `input` and logs the shape metadata of every layer.
///
/// # Arguments
/// * `graph` - The graph to add the network to.
/// * `input` - An NHWC input of `graph`.
/// * `plan` - The channels and kernel sizes of every stage.
/// * `n_classes` - The width of the classifier.
///
/// # Returns
/// The classifier's output and the layer log, or the first error raised while building.
pub fn build(
    graph: &mut Graph,
    input: &Tensor,
    plan: &StagePlan,
    n_classes: usize,
) -> Result<(Tensor, LayerLog)> {
    let mut log = LayerLog::new();

    let (h, w) = input.spatial()?;
    let (cout, ks) = (plan.channel(0)?, plan.kernel(0)?);
    let mut x = graph.conv2d(input, cout, ks, 2, Padding::Same, "conv1")?;
    x = graph.batch_norm(&x, "conv1.bn")?;
    x = graph.activation(&x, ActFn::Relu, "conv1.relu")?;
    log.push(
        "layer1".into(),
        LayerRecord::conv(OpKind::ConvBnRelu, (INPUT_CHANNELS, cout), ks, 2, (h, w)),
    );

    let schedule = block_schedule();
    for (i, block) in schedule.iter().enumerate() {
        let n = i + 2;
        let (cin, cout, ks) = (plan.channel(i)?, plan.channel(i + 1)?, plan.kernel(i)?);
        let stride = block.depthwise_stride();

        let (h, w) = x.spatial()?;
        let name = format!("dwconv{n}.1");
        x = graph.depthwise_conv2d(&x, ks, stride, Padding::Same, &name)?;
        x = graph.batch_norm(&x, &format!("{name}.bn"))?;
        x = graph.activation(&x, ActFn::Relu, &format!("{name}.relu"))?;
        log.push(
            format!("layer{n}.1"),
            LayerRecord::conv(OpKind::DwconvBnRelu, (cin, cin), ks, stride, (h, w)),
        );

        let (h, w) = x.spatial()?;
        let name = format!("conv{n}.2");
        x = graph.conv2d(&x, cout, 1, 1, Padding::Same, &name)?;
        x = graph.batch_norm(&x, &format!("{name}.bn"))?;
        x = graph.activation(&x, ActFn::Relu, &format!("{name}.relu"))?;
        log.push(
            format!("layer{n}.2"),
            LayerRecord::conv(OpKind::ConvBnRelu, (cin, cout), 1, 1, (h, w)),
        );
    }

    // the pool and classifier are numbered as if one more block had been built
    let n = schedule.len() + 3;
    let channels = plan.channel(schedule.len())?;

    x = graph.reduce_mean(&x, &[1, 2], true, "pool")?;
    x = graph.flatten(&x, "flatten")?;
    log.push(format!("layer{n}"), LayerRecord::global_pool(channels));

    x = graph.fc_layer(&x, n_classes, "fc")?;
    log.push(
        format!("layer{}", n + 1),
        LayerRecord::fc(channels, n_classes),
    );

    debug!("built {} layers over {} graph nodes", log.len(), graph.len());
    Ok((x, log))
}
