//! Cache entry types
//!
//! Per fingerprint the state only moves forward:
//! absent → [`SurfaceEntry::Pending`] → [`SurfaceEntry::Completed`].
//! A completed entry is never rewritten.

use crate::fingerprint::Fingerprint;
use cobalt_store::OwnerId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Observable entry state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceStatus {
    Pending,
    Completed,
}

/// Result dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotType {
    #[serde(rename = "1D")]
    OneD,
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
}

impl PlotType {
    /// Number of swept axes
    #[inline]
    #[must_use]
    pub const fn axes(self) -> usize {
        match self {
            Self::OneD => 1,
            Self::TwoD => 2,
            Self::ThreeD => 3,
        }
    }
}

/// Synthesized surface
///
/// `timeseries` maps the sample index (as a string) to the axis values
/// followed by the rating label. 1D results name their axis in
/// `param_name`; 2D and 3D results use `param_names`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceResult {
    pub plot_type: PlotType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_names: Option<Vec<String>>,
    pub timeseries: IndexMap<String, Vec<Value>>,
}

impl SurfaceResult {
    /// Number of samples
    #[inline]
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.timeseries.len()
    }

    /// Axis names regardless of dimensionality
    #[must_use]
    pub fn axis_names(&self) -> Vec<&str> {
        match (&self.param_name, &self.param_names) {
            (Some(name), _) => vec![name.as_str()],
            (None, Some(names)) => names.iter().map(String::as_str).collect(),
            (None, None) => Vec::new(),
        }
    }

    /// Rating label of each sample, in index order
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.timeseries
            .values()
            .filter_map(|sample| sample.last().and_then(Value::as_str))
            .collect()
    }
}

/// One cache slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SurfaceEntry {
    /// Request seen, nothing computed yet
    Pending {
        request: Map<String, Value>,
        user_id: OwnerId,
    },
    /// Final, immutable result
    Completed(SurfaceResult),
}

impl SurfaceEntry {
    /// Current state
    #[inline]
    #[must_use]
    pub fn status(&self) -> SurfaceStatus {
        match self {
            Self::Pending { .. } => SurfaceStatus::Pending,
            Self::Completed(_) => SurfaceStatus::Completed,
        }
    }
}

/// On-disk cache document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDocument {
    #[serde(default)]
    pub scenario_surfaces: IndexMap<Fingerprint, SurfaceEntry>,
}

/// Answer to a submit call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(rename = "scenarioSurfaceResponseId")]
    pub fingerprint: Fingerprint,
    pub status: SurfaceStatus,
}
