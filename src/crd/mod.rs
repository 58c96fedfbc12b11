//! Typed cluster hierarchy resources
//!
//! Minimal CRD definitions for the objects this toolkit resolves: a
//! Cluster owning Machines, a MachineDeployment grouping pools of
//! machines. Only the fields the toolkit actually consumes are modeled;
//! the controllers that own these types carry the full schemas.

mod cluster;
mod machine;

pub use cluster::{Cluster, ClusterSpec};
pub use machine::{Machine, MachineDeployment, MachineDeploymentSpec, MachineSpec};
