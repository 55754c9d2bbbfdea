pub mod configs;
pub mod error;
pub mod generation;
pub mod mobilenet;
pub mod record;
pub mod sampling;

pub use error::{ArchErr, Result};
pub use generation::{Generated, generate};
pub use mobilenet::{MobileNetV1, StagePlan};
pub use record::{LayerLog, LayerRecord, OpKind};
