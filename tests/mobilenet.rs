use std::{cell::RefCell, rc::Rc};

use arch_generator::{
    MobileNetV1, OpKind, StagePlan,
    configs::{ArchConfig, GeneratorConfig},
    generate,
};
use ndarray::Array4;
use rand::{SeedableRng, rngs::StdRng};
use tensor_graph::Graph;

const CONFIG: &str = r#"{
    "n_classes": 10,
    "sample_space": {
        "channel": { "start": 0.25, "end": 0.5, "step": 0.125 },
        "kernelsize": [3, 5]
    },
    "sample": true,
    "version": "v1",
    "seed": 7,
    "input_shape": [2, 32, 32, 3],
    "count": 3
}"#;

#[test]
fn sampled_network_runs_forward() {
    let cfg = ArchConfig::from_json(CONFIG).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let mut graph = Graph::new();
    let input = graph.placeholder("input", &[2, 32, 32, 3]).unwrap();
    let net = MobileNetV1::new(&mut graph, &input, &cfg, &mut rng).unwrap();

    let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(1)));
    let mut param_gen = graph.param_gen(rng).unwrap();
    let params = graph.init_params(&mut param_gen).unwrap();
    assert_eq!(params.len(), graph.size());

    let images = Array4::from_shape_fn((2, 32, 32, 3), |(n, h, w, c)| {
        ((n + h * 3 + w * 5 + c * 7) % 11) as f32 / 11.
    });
    let logits = graph
        .forward(&params, &[(&input, images.view().into_dyn())], net.out())
        .unwrap();

    assert_eq!(logits.shape(), &[2, 10]);
    assert!(logits.iter().all(|x| x.is_finite()));
}

#[test]
fn generator_config_round_trips_into_a_batch() {
    let cfg = GeneratorConfig::from_json(CONFIG).unwrap();
    assert_eq!(cfg.arch.n_classes, 10);
    assert_eq!(cfg.input_shape, [2, 32, 32, 3]);

    let generated = generate(&cfg).unwrap();
    assert!(!generated.is_empty() && generated.len() <= 3);

    for arch in &generated {
        assert_eq!(arch.layers.len(), 29);

        let (name, fc) = arch.layers.last().unwrap();
        assert_eq!(name, "layer17");
        assert_eq!(fc.op, OpKind::Fc);
        assert_eq!(fc.cout, 10);

        let (_, stem) = arch.layers.first().unwrap();
        assert_eq!((stem.inputh, stem.inputw), (Some(32), Some(32)));
    }
}

#[test]
fn serialized_layers_keep_build_order() {
    let mut graph = Graph::new();
    let input = graph.placeholder("input", &[1, 224, 224, 3]).unwrap();
    let net = MobileNetV1::with_plan(&mut graph, &input, StagePlan::baseline(), 1000).unwrap();

    let json = serde_json::to_string(net.layers()).unwrap();
    let at = |key: &str| json.find(&format!("\"{key}\"")).unwrap();

    assert!(at("layer1") < at("layer2.1"));
    assert!(at("layer2.2") < at("layer10.1"));
    assert!(at("layer14.2") < at("layer16"));
    assert!(at("layer16") < at("layer17"));
    assert!(json.contains(r#""op":"dwconv-bn-relu""#));
    assert!(json[at("layer17")..].contains(r#""ks":null"#));
}
