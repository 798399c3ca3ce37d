//! Declarative space configuration, loadable from TOML.
//!
//! A [`SpaceConfig`] names a topology and its construction parameters.
//! [`SpaceConfig::build`] validates it and produces an [`AnySpace`]:
//!
//! ```toml
//! topology = "grid"
//! dims = [20, 20]
//! periodic = [true, false]
//! metric = "manhattan"
//! ```

use crate::any::AnySpace;
use crate::boundary::Boundary;
use crate::continuous::ContinuousSpace;
use crate::graph::{GraphSpace, NeighborMode};
use crate::grid::{GridMetric, GridSpace};
use crate::network::{NetworkSpace, Road};
use crate::space::{check_ndim, Space};
use habitat_core::SpaceError;
use serde::{Deserialize, Serialize};

/// Which axes wrap around.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Periodicity {
    /// The same for every axis.
    All(bool),
    /// One flag per axis.
    PerAxis(Vec<bool>),
}

impl Default for Periodicity {
    fn default() -> Self {
        Self::All(true)
    }
}

impl Periodicity {
    /// Per-axis boundaries for a space with `ndim` axes.
    pub fn boundaries(&self, ndim: usize) -> Result<Vec<Boundary>, SpaceError> {
        match self {
            Self::All(p) => Ok(vec![Boundary::from_periodic(*p); ndim]),
            Self::PerAxis(flags) => {
                check_ndim(ndim, flags.len())?;
                Ok(flags.iter().map(|&p| Boundary::from_periodic(p)).collect())
            }
        }
    }
}

/// A road in a network configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadConfig {
    /// Start intersection.
    pub from: u32,
    /// End intersection.
    pub to: u32,
    /// Road length.
    pub length: f64,
}

/// Construction parameters for a space of any topology.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topology", rename_all = "snake_case")]
pub enum SpaceConfig {
    /// A discrete grid.
    Grid {
        /// Axis lengths.
        dims: Vec<u32>,
        /// Wrapping axes. Default: all periodic.
        #[serde(default)]
        periodic: Periodicity,
        /// Neighbourhood metric. Default: Chebyshev.
        #[serde(default)]
        metric: GridMetric,
    },
    /// A continuous box.
    Continuous {
        /// Axis extents.
        extent: Vec<f64>,
        /// Wrapping axes. Default: all periodic.
        #[serde(default)]
        periodic: Periodicity,
        /// Cell-list bucket size. Default: a tenth of the shortest extent.
        #[serde(default)]
        cell_size: Option<f64>,
    },
    /// An arbitrary graph.
    Graph {
        /// Number of vertices.
        vertices: usize,
        /// Edges as `[from, to]` pairs.
        #[serde(default)]
        edges: Vec<(u32, u32)>,
        /// Whether edges are one-way. Default: false.
        #[serde(default)]
        directed: bool,
        /// Adjacency mode for directed graphs. Default: outgoing.
        #[serde(default)]
        neighbors: NeighborMode,
    },
    /// A road network.
    Network {
        /// Number of intersections.
        vertices: usize,
        /// Roads between intersections.
        #[serde(default)]
        roads: Vec<RoadConfig>,
        /// Add the reverse of every road. Default: false.
        #[serde(default)]
        two_way: bool,
    },
}

impl SpaceConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, SpaceError> {
        toml::from_str(src).map_err(|e| SpaceError::Config {
            reason: e.to_string(),
        })
    }

    /// Validate the configuration and construct the space.
    pub fn build(&self) -> Result<AnySpace, SpaceError> {
        let space: AnySpace = match self {
            Self::Grid {
                dims,
                periodic,
                metric,
            } => GridSpace::new(dims, &periodic.boundaries(dims.len())?)?
                .with_metric(*metric)
                .into(),
            Self::Continuous {
                extent,
                periodic,
                cell_size,
            } => {
                let space = ContinuousSpace::new(extent, &periodic.boundaries(extent.len())?)?;
                match cell_size {
                    Some(size) => space.with_cell_size(*size)?.into(),
                    None => space.into(),
                }
            }
            Self::Graph {
                vertices,
                edges,
                directed,
                neighbors,
            } => GraphSpace::from_edges(*vertices, edges, *directed)?
                .with_neighbor_mode(*neighbors)
                .into(),
            Self::Network {
                vertices,
                roads,
                two_way,
            } => {
                let roads: Vec<Road> = roads
                    .iter()
                    .map(|r| Road::new(r.from, r.to, r.length))
                    .collect();
                if *two_way {
                    NetworkSpace::two_way(*vertices, &roads)?.into()
                } else {
                    NetworkSpace::new(*vertices, &roads)?.into()
                }
            }
        };
        tracing::debug!(topology = %space.topology(), "space built from config");
        Ok(space)
    }
}
