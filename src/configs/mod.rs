mod arch;
mod generator;

pub use arch::{ArchConfig, ChannelRange, SampleSpace};
pub use generator::GeneratorConfig;
