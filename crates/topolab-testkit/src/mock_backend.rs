//! In-memory topology backend
//!
//! Behaves like the deployment service closely enough for session tests:
//! starting records the request and reports the topology as up, stopping
//! reports it down, saved descriptions are kept by name. Attacks and the
//! rate test need a deployed topology. Every call is recorded, and any
//! operation can be made to fail.
//!
//! Uses `std::sync::Mutex`; locks are never held across an await.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use topolab_core::{
    AttackRequest, LinkParameterLookup, StartRequest, TopologyDescription,
    TopologyStateResponse, TxRateSample,
};
use topolab_editor::{BackendError, TopologyBackend};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `start_topology`
    Start(StartRequest),
    /// `stop_topology`
    Stop,
    /// `get_topology_state`
    GetState,
    /// `save_topology`
    Save {
        /// Topology name
        name: String,
        /// Compact description JSON
        description_json: String,
    },
    /// `topology_description`
    Describe(String),
    /// `stop_node`
    StopNode(u16),
    /// `change_start_defence`
    ChangeDefence(bool),
    /// `start_attack`
    Attack {
        /// Index of the attacking node
        attacker_index: u32,
        /// Request body
        request: AttackRequest,
    },
    /// `start_tx_rate_test`
    TxRateStart,
    /// `stop_tx_rate_test`
    TxRateStop,
    /// `install_channel_and_chaincode`
    InstallChaincode,
}

impl BackendCall {
    fn operation(&self) -> &'static str {
        match self {
            BackendCall::Start(_) => "start",
            BackendCall::Stop => "stop",
            BackendCall::GetState => "state",
            BackendCall::Save { .. } => "save",
            BackendCall::Describe(_) => "describe",
            BackendCall::StopNode(_) => "stop_node",
            BackendCall::ChangeDefence(_) => "defence",
            BackendCall::Attack { .. } => "attack",
            BackendCall::TxRateStart => "tx_rate_start",
            BackendCall::TxRateStop => "tx_rate_stop",
            BackendCall::InstallChaincode => "chaincode",
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<BackendCall>,
    failing: HashSet<&'static str>,
    running: Option<StartRequest>,
    links: Option<LinkParameterLookup>,
    ports: BTreeMap<String, u16>,
    saved: BTreeMap<String, TopologyDescription>,
    defence: bool,
    tx_samples: usize,
}

/// Recording [`TopologyBackend`].
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// A backend with nothing deployed and nothing saved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make one operation fail. Operation names: `start`, `stop`, `state`,
    /// `save`, `describe`, `stop_node`, `defence`, `attack`,
    /// `tx_rate_start`, `tx_rate_stop`, `chaincode`.
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(operation);
        self
    }

    /// Let a previously failing operation succeed again.
    pub fn recover(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.remove(operation);
    }

    /// Store a named description.
    pub fn with_preset(self, name: &str, description: TopologyDescription) -> Self {
        self.state
            .lock()
            .unwrap()
            .saved
            .insert(name.to_string(), description);
        self
    }

    /// Report `request` as already deployed.
    pub fn with_running(self, request: StartRequest) -> Self {
        self.deploy(request);
        self
    }

    /// Addressing metadata reported with the running topology.
    pub fn with_links(self, links: LinkParameterLookup) -> Self {
        self.state.lock().unwrap().links = Some(links);
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls received so far, excluding state queries.
    pub fn commands(&self) -> Vec<BackendCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != BackendCall::GetState)
            .collect()
    }

    /// The deployed request, if any.
    pub fn running(&self) -> Option<StartRequest> {
        self.state.lock().unwrap().running.clone()
    }

    /// Whether defence measures are on.
    pub fn defence(&self) -> bool {
        self.state.lock().unwrap().defence
    }

    /// Management port assigned to a container.
    pub fn port_of(&self, container_name: &str) -> Option<u16> {
        self.state.lock().unwrap().ports.get(container_name).copied()
    }

    fn require_running(&self, operation: &str) -> Result<(), BackendError> {
        if self.running().is_some() {
            Ok(())
        } else {
            Err(BackendError::rejected(operation, "no topology is running"))
        }
    }

    fn deploy(&self, request: StartRequest) {
        let mut state = self.state.lock().unwrap();
        state.ports = request
            .description
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id().container_name(), 30000 + i as u16))
            .collect();
        state.defence = request.config.start_defence;
        state.running = Some(request);
    }

    fn record(&self, call: BackendCall) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        let operation = call.operation();
        state.calls.push(call);
        if state.failing.contains(operation) {
            tracing::debug!(operation, "mock backend failing call");
            Err(BackendError::rejected(operation, "mock failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TopologyBackend for MockBackend {
    async fn start_topology(&self, request: &StartRequest) -> Result<(), BackendError> {
        self.record(BackendCall::Start(request.clone()))?;
        if self.running().is_some() {
            return Err(BackendError::rejected("start", "a topology is already running"));
        }
        self.deploy(request.clone());
        Ok(())
    }

    async fn stop_topology(&self) -> Result<(), BackendError> {
        self.record(BackendCall::Stop)?;
        let mut state = self.state.lock().unwrap();
        state.running = None;
        state.ports.clear();
        Ok(())
    }

    async fn get_topology_state(&self) -> Result<TopologyStateResponse, BackendError> {
        self.record(BackendCall::GetState)?;
        let state = self.state.lock().unwrap();
        let mut response = match &state.running {
            Some(request) => {
                let mut up = TopologyStateResponse::up(request.clone(), state.links.clone());
                up.container_name_to_port_mapping =
                    state.ports.iter().map(|(k, v)| (k.clone(), *v)).collect();
                up
            }
            None => TopologyStateResponse::down(),
        };
        response.all_topology_names = state.saved.keys().cloned().collect();
        Ok(response)
    }

    async fn save_topology(
        &self,
        name: &str,
        description_json: &str,
    ) -> Result<Vec<String>, BackendError> {
        self.record(BackendCall::Save {
            name: name.to_string(),
            description_json: description_json.to_string(),
        })?;
        let description = TopologyDescription::from_json(description_json)
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        let mut state = self.state.lock().unwrap();
        state.saved.insert(name.to_string(), description);
        Ok(state.saved.keys().cloned().collect())
    }

    async fn topology_description(&self, name: &str) -> Result<TopologyDescription, BackendError> {
        self.record(BackendCall::Describe(name.to_string()))?;
        self.state
            .lock()
            .unwrap()
            .saved
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::rejected("describe", format!("no topology named {name}")))
    }

    async fn stop_node(&self, port: u16) -> Result<(), BackendError> {
        self.record(BackendCall::StopNode(port))?;
        let known = self.state.lock().unwrap().ports.values().any(|p| *p == port);
        if known {
            Ok(())
        } else {
            Err(BackendError::rejected("stop_node", format!("no container on port {port}")))
        }
    }

    async fn change_start_defence(&self, enabled: bool) -> Result<(), BackendError> {
        self.record(BackendCall::ChangeDefence(enabled))?;
        self.state.lock().unwrap().defence = enabled;
        Ok(())
    }

    async fn start_attack(
        &self,
        attacker_index: u32,
        request: &AttackRequest,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::Attack {
            attacker_index,
            request: request.clone(),
        })?;
        self.require_running("attack")?;
        let state = self.state.lock().unwrap();
        for container in [&request.attack_node, &request.attacked_node] {
            if !state.ports.contains_key(container) {
                return Err(BackendError::rejected(
                    "attack",
                    format!("no container named {container}"),
                ));
            }
        }
        Ok(())
    }

    async fn start_tx_rate_test(&self) -> Result<TxRateSample, BackendError> {
        self.record(BackendCall::TxRateStart)?;
        self.require_running("tx_rate_start")?;
        let mut state = self.state.lock().unwrap();
        state.tx_samples += 1;
        let samples = state.tx_samples;
        Ok(TxRateSample {
            time_list: (1..=samples).map(|t| t.to_string()).collect(),
            rate_list: (1..=samples).map(|t| 100.0 * t as f64).collect(),
        })
    }

    async fn stop_tx_rate_test(&self) -> Result<(), BackendError> {
        self.record(BackendCall::TxRateStop)?;
        self.state.lock().unwrap().tx_samples = 0;
        Ok(())
    }

    async fn install_channel_and_chaincode(&self) -> Result<(), BackendError> {
        self.record(BackendCall::InstallChaincode)?;
        self.require_running("chaincode")
    }
}
