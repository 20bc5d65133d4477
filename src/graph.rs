//! The contract dependency graph and the deployment plan derived from it
//!
//! The deployment order is not hand-assumed: the graph is declared as
//! explicit nodes and edges, validated, and topologically sorted, so adding a
//! contract to the suite cannot silently break the ordering invariants.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::Address;
use itertools::Itertools;
use tracing::warn;

use crate::{errors::ScriptError, types::ContractName};

/// A directed acyclic graph of contract dependencies.
///
/// An edge `(a, b)` means `b` depends on `a`: `a`'s address must be known
/// before `b` can be constructed.
pub struct DependencyGraph {
    /// The graph's nodes, in the order ties are broken during sorting
    nodes: Vec<ContractName>,
    /// Edges as (dependency, dependent) pairs
    edges: Vec<(ContractName, ContractName)>,
}

impl DependencyGraph {
    /// Create a graph from explicit nodes and edges
    pub fn new(nodes: Vec<ContractName>, edges: Vec<(ContractName, ContractName)>) -> Self {
        Self { nodes, edges }
    }

    /// The dependency graph of the EncryptedERC suite.
    ///
    /// The registrar binds the registration verifier; the token contract
    /// binds the registrar, the three spending verifiers, and the BabyJubJub
    /// library.
    pub fn standard() -> Self {
        use ContractName::*;
        Self::new(
            ContractName::ALL.to_vec(),
            vec![
                (RegistrationVerifier, Registrar),
                (Registrar, EncryptedERC),
                (MintVerifier, EncryptedERC),
                (WithdrawVerifier, EncryptedERC),
                (TransferVerifier, EncryptedERC),
                (BabyJubJub, EncryptedERC),
            ],
        )
    }

    /// The direct dependencies of the given contract
    pub fn dependencies_of(&self, contract: ContractName) -> Vec<ContractName> {
        self.edges
            .iter()
            .filter(|(_, dependent)| *dependent == contract)
            .map(|(dependency, _)| *dependency)
            .collect()
    }

    /// A topological ordering of the graph, breaking ties by node
    /// declaration order so the result is deterministic.
    ///
    /// Fails if an edge references a contract that is not a node, or if the
    /// graph contains a cycle.
    pub fn deployment_order(&self) -> Result<Vec<ContractName>, ScriptError> {
        let mut indegree: BTreeMap<ContractName, usize> =
            self.nodes.iter().map(|&n| (n, 0)).collect();
        for (dependency, dependent) in &self.edges {
            for node in [dependency, dependent] {
                if !indegree.contains_key(node) {
                    return Err(ScriptError::InvalidDependencyGraph(format!(
                        "{node} appears in an edge but is not a node"
                    )));
                }
            }
            // Can `unwrap` here since both endpoints were just checked
            *indegree.get_mut(dependent).unwrap() += 1;
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut emitted = BTreeSet::new();
        while order.len() < self.nodes.len() {
            let next = self
                .nodes
                .iter()
                .copied()
                .find(|n| !emitted.contains(n) && indegree[n] == 0);

            match next {
                Some(node) => {
                    emitted.insert(node);
                    order.push(node);
                    for (dependency, dependent) in &self.edges {
                        if *dependency == node {
                            // Can `unwrap` here since edge endpoints are validated above
                            *indegree.get_mut(dependent).unwrap() -= 1;
                        }
                    }
                }
                None => {
                    let stuck = self
                        .nodes
                        .iter()
                        .filter(|n| !emitted.contains(*n))
                        .map(ToString::to_string)
                        .join(", ");
                    return Err(ScriptError::InvalidDependencyGraph(format!(
                        "dependency cycle among: {stuck}"
                    )));
                }
            }
        }

        Ok(order)
    }
}

/// A single step of a deployment plan
#[derive(Debug, Clone)]
pub struct DeploymentStep {
    /// The contract this step resolves an address for
    pub contract: ContractName,
    /// The contracts whose addresses must be known before this step runs
    pub depends_on: Vec<ContractName>,
    /// A previously deployed address the caller offered for reuse
    pub existing: Option<Address>,
}

/// An ordered list of deployment steps, topologically consistent with the
/// dependency graph
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    /// The steps, in the order they must execute
    pub steps: Vec<DeploymentStep>,
}

impl DeploymentPlan {
    /// Build a plan from the dependency graph, attaching any existing
    /// addresses the caller supplied.
    ///
    /// An address supplied for a contract that is always deployed fresh is
    /// dropped here, so the reuse decision is never even offered for it.
    pub fn new(
        graph: &DependencyGraph,
        existing: &BTreeMap<ContractName, Address>,
    ) -> Result<Self, ScriptError> {
        let order = graph.deployment_order()?;
        let steps = order
            .into_iter()
            .map(|contract| {
                let supplied = existing.get(&contract).copied();
                let existing = if contract.always_fresh() {
                    if supplied.is_some() {
                        warn!("ignoring supplied address for {contract}, it is always deployed fresh");
                    }
                    None
                } else {
                    supplied
                };

                DeploymentStep {
                    contract,
                    depends_on: graph.dependencies_of(contract),
                    existing,
                }
            })
            .collect();

        Ok(Self { steps })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use alloy_primitives::Address;

    use super::{DependencyGraph, DeploymentPlan};
    use crate::{errors::ScriptError, types::ContractName};

    /// The position of a contract in an ordering
    fn position(order: &[ContractName], contract: ContractName) -> usize {
        order.iter().position(|&n| n == contract).unwrap()
    }

    #[test]
    fn test_standard_order_respects_dependencies() {
        let graph = DependencyGraph::standard();
        let order = graph.deployment_order().unwrap();

        assert_eq!(order.len(), 7);
        assert!(
            position(&order, ContractName::RegistrationVerifier)
                < position(&order, ContractName::Registrar)
        );
        for dependency in [
            ContractName::Registrar,
            ContractName::MintVerifier,
            ContractName::WithdrawVerifier,
            ContractName::TransferVerifier,
            ContractName::BabyJubJub,
        ] {
            assert!(position(&order, dependency) < position(&order, ContractName::EncryptedERC));
        }
    }

    #[test]
    fn test_standard_order_is_canonical() {
        let order = DependencyGraph::standard().deployment_order().unwrap();
        assert_eq!(order, ContractName::ALL);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let graph = DependencyGraph::new(
            vec![ContractName::Registrar, ContractName::EncryptedERC],
            vec![
                (ContractName::Registrar, ContractName::EncryptedERC),
                (ContractName::EncryptedERC, ContractName::Registrar),
            ],
        );

        let err = graph.deployment_order().unwrap_err();
        assert!(matches!(err, ScriptError::InvalidDependencyGraph(ref s) if s.contains("cycle")));
    }

    #[test]
    fn test_edge_to_unknown_node_is_rejected() {
        let graph = DependencyGraph::new(
            vec![ContractName::Registrar],
            vec![(ContractName::RegistrationVerifier, ContractName::Registrar)],
        );

        let err = graph.deployment_order().unwrap_err();
        assert!(matches!(err, ScriptError::InvalidDependencyGraph(_)));
    }

    #[test]
    fn test_plan_attaches_dependencies_and_existing_addresses() {
        let supplied = Address::repeat_byte(0x99);
        let mut existing = BTreeMap::new();
        existing.insert(ContractName::Registrar, supplied);

        let plan = DeploymentPlan::new(&DependencyGraph::standard(), &existing).unwrap();
        let registrar = plan
            .steps
            .iter()
            .find(|s| s.contract == ContractName::Registrar)
            .unwrap();

        assert_eq!(registrar.depends_on, vec![ContractName::RegistrationVerifier]);
        assert_eq!(registrar.existing, Some(supplied));
    }

    #[test]
    fn test_plan_strips_existing_address_of_main_contract() {
        let mut existing = BTreeMap::new();
        existing.insert(ContractName::EncryptedERC, Address::repeat_byte(0x99));

        let plan = DeploymentPlan::new(&DependencyGraph::standard(), &existing).unwrap();
        let main = plan
            .steps
            .iter()
            .find(|s| s.contract == ContractName::EncryptedERC)
            .unwrap();

        assert_eq!(main.existing, None);
    }
}
