//! bayesmix model core.
//!
//! Statistical building blocks driven by an external Gibbs sampler:
//! - [`hierarchy`]: per-cluster likelihood and prior families
//! - [`mixing`]: partition laws and their cluster-assignment masses
//! - [`mh`]: random-walk Metropolis for non-conjugate families
//! - [`cluster`]: the bundle of state, statistics and data for one cluster
//! - [`registry`]: config-driven construction of a [`registry::Model`]
//! - [`logging`]: subscriber setup for the `tracing` events emitted here

pub mod cluster;
pub mod hierarchy;
pub mod logging;
pub mod mh;
pub mod mixing;
pub mod registry;

pub use bmx_common::{Error, ErrorCategory, Result, StructuredError};
pub use cluster::Cluster;
pub use hierarchy::{
    conjugate_update, non_conjugate_update, ClusterData, ConjugateHierarchy, Hierarchy,
    LapNigHierarchy, LaplaceState, LaplaceStats, NnigHierarchy, NonConjugateHierarchy,
    NormalState, NormalStats,
};
pub use mh::{AcceptanceTracker, MhStep, RandomWalkMetropolis};
pub use mixing::{
    DirichletProcess, MassScale, MixingProcess, PitmanYorProcess, StickBreaking,
};
pub use registry::{HierarchyModel, Model, Registry};
