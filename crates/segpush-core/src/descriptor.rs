//! JSON topology description: the human-authored input of a run.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// A named list of segment descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyDescription {
    #[serde(alias = "path_segments", alias = "segs")]
    pub segments: Vec<SegmentDescriptor>,
}

impl TopologyDescription {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a topology file.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let topology = Self::from_json(&contents)?;
        tracing::debug!(
            path = %path.display(),
            segments = topology.segments.len(),
            "topology description loaded"
        );
        Ok(topology)
    }
}

/// One segment to construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    #[serde(rename = "srcISD")]
    pub src_isd: u16,
    #[serde(rename = "srcAS")]
    pub src_as: String,
    #[serde(rename = "dstISD")]
    pub dst_isd: u16,
    #[serde(rename = "dstAS")]
    pub dst_as: String,
    /// Declared hop count, copied into the segment header as is.
    pub nb_hops: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<u64>,
    #[serde(rename = "ASentries")]
    pub as_entries: Vec<AsEntryDescriptor>,
}

/// One AS's contribution, exactly one hop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsEntryDescriptor {
    #[serde(rename = "IA")]
    pub ia: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f32>,
    pub hop: HopDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopDescriptor {
    #[serde(rename = "InIA")]
    pub in_ia: String,
    #[serde(rename = "InIF")]
    pub in_if: u64,
    #[serde(rename = "OutIA")]
    pub out_ia: String,
    #[serde(rename = "OutIF")]
    pub out_if: u64,
}
