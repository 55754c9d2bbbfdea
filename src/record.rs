use std::fmt;

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

/// The fused operator a logged layer stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpKind {
    ConvBnRelu,
    DwconvBnRelu,
    GlobalPool,
    Fc,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpKind::ConvBnRelu => "conv-bn-relu",
            OpKind::DwconvBnRelu => "dwconv-bn-relu",
            OpKind::GlobalPool => "global-pool",
            OpKind::Fc => "fc",
        };

        f.write_str(s)
    }
}

/// The shape metadata of one layer, as consumed by latency profiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub op: OpKind,
    pub cin: usize,
    pub cout: usize,
    pub ks: Option<usize>,
    pub stride: Option<usize>,
    pub inputh: Option<usize>,
    pub inputw: Option<usize>,
}

impl LayerRecord {
    /// A convolution-like layer with a kernel, a stride and a spatial input of `(h, w)`.
    pub fn conv(
        op: OpKind,
        (cin, cout): (usize, usize),
        ks: usize,
        stride: usize,
        (h, w): (usize, usize),
    ) -> Self {
        Self {
            op,
            cin,
            cout,
            ks: Some(ks),
            stride: Some(stride),
            inputh: Some(h),
            inputw: Some(w),
        }
    }

    /// Global pooling over `channels`, logged with a 1x1 spatial size.
    pub fn global_pool(channels: usize) -> Self {
        Self {
            op: OpKind::GlobalPool,
            cin: channels,
            cout: channels,
            ks: None,
            stride: None,
            inputh: Some(1),
            inputw: Some(1),
        }
    }

    pub fn fc(cin: usize, cout: usize) -> Self {
        Self {
            op: OpKind::Fc,
            cin,
            cout,
            ks: None,
            stride: None,
            inputh: None,
            inputw: None,
        }
    }
}

/// The ordered mapping from layer name to its record.
///
/// Entries keep the order they were built in, also when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerLog {
    entries: Vec<(String, LayerRecord)>,
}

impl LayerLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: String, record: LayerRecord) {
        self.entries.push((name, record));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&LayerRecord> {
        self.entries
            .iter()
            .find_map(|(n, record)| (n == name).then_some(record))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn records(&self) -> impl Iterator<Item = &LayerRecord> {
        self.entries.iter().map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LayerRecord)> {
        self.entries
            .iter()
            .map(|(name, record)| (name.as_str(), record))
    }

    pub fn first(&self) -> Option<(&str, &LayerRecord)> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<(&str, &LayerRecord)> {
        self.iter().last()
    }
}

impl Serialize for LayerLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, record) in &self.entries {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}
