//! Backend-reported topology state

use crate::description::StartRequest;
use crate::error::{TopologyError, TopologyResult};
use crate::link_params::LinkParameterLookup;
use crate::node::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Whether the backend currently runs a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// A topology is deployed
    Up,
    /// Nothing is deployed
    Down,
}

/// Response of the state query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyStateResponse {
    /// `"up"` or `"down"`; anything else is rejected by [`Self::running`].
    pub state: String,
    /// Parameters the running topology was started with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_params: Option<StartRequest>,
    /// Addressing metadata of the running links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<LinkParameterLookup>,
    /// Management port per container name
    #[serde(default)]
    pub container_name_to_port_mapping: IndexMap<String, u16>,
    /// Names of the saved topologies
    #[serde(default)]
    pub all_topology_names: Vec<String>,
}

impl TopologyStateResponse {
    /// A "down" response with no saved topologies.
    pub fn down() -> Self {
        Self {
            state: "down".to_string(),
            topology_params: None,
            links: None,
            container_name_to_port_mapping: IndexMap::new(),
            all_topology_names: Vec::new(),
        }
    }

    /// An "up" response for a running topology.
    pub fn up(params: StartRequest, links: Option<LinkParameterLookup>) -> Self {
        Self {
            state: "up".to_string(),
            topology_params: Some(params),
            links,
            ..Self::down()
        }
    }

    /// Decoded run state.
    pub fn run_state(&self) -> TopologyResult<RunState> {
        match self.state.as_str() {
            "up" => Ok(RunState::Up),
            "down" => Ok(RunState::Down),
            other => Err(TopologyError::UnsupportedState(other.to_string())),
        }
    }

    /// The running topology, if the state is `up` and parameters were sent.
    pub fn running(&self) -> TopologyResult<Option<&StartRequest>> {
        Ok(match self.run_state()? {
            RunState::Up => self.topology_params.as_ref(),
            RunState::Down => None,
        })
    }

    /// Management port of a node's container.
    pub fn port_for(&self, node: NodeId) -> Option<u16> {
        self.container_name_to_port_mapping
            .get(&node.container_name())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;

    #[test]
    fn test_down_response_parses() {
        let resp: TopologyStateResponse =
            serde_json::from_str(r#"{"state": "down", "all_topology_names": ["ring"]}"#).unwrap();
        assert_eq!(resp.run_state().unwrap(), RunState::Down);
        assert!(resp.running().unwrap().is_none());
        assert_eq!(resp.all_topology_names, vec!["ring".to_string()]);
    }

    #[test]
    fn test_unknown_state_is_error() {
        let resp: TopologyStateResponse = serde_json::from_str(r#"{"state": "paused"}"#).unwrap();
        assert_eq!(
            resp.run_state(),
            Err(TopologyError::UnsupportedState("paused".to_string()))
        );
        assert!(resp.running().is_err());
    }

    #[test]
    fn test_port_lookup_uses_container_name() {
        let mut resp = TopologyStateResponse::up(StartRequest::default(), None);
        resp.container_name_to_port_mapping
            .insert("Router-2".to_string(), 30002);
        assert_eq!(resp.port_for(NodeId::new(NodeType::Router, 2)), Some(30002));
        assert_eq!(resp.port_for(NodeId::new(NodeType::Router, 1)), None);
    }
}
