use std::{env, io, process};

use anyhow::Context;
use arch_generator::{configs::GeneratorConfig, generate};
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        process::exit(1);
    }

    let path = &args[1];
    let cfg = GeneratorConfig::from_path(path)
        .with_context(|| format!("failed to load generator config from {path}"))?;
    info!(
        "generating {} architecture(s) for {} classes over {:?}",
        cfg.count, cfg.arch.n_classes, cfg.input_shape
    );

    let generated = generate(&cfg).context("failed to build architecture")?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &generated)?;
    println!();
    Ok(())
}
