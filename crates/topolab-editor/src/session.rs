//! Editor session
//!
//! Couples one [`TopologyEditor`] with the backend. The session owns the
//! start parameters, mirrors the backend's running state into the editor and
//! turns backend outcomes into operator notices. A backend failure never
//! touches the model: nothing is applied before the backend has agreed.

use crate::backend::TopologyBackend;
use crate::canvas::CanvasEffects;
use crate::editor::{EditorRequest, Notice, TopologyEditor, PAUSE_UNAVAILABLE_MESSAGE};
use crate::error::{EditorError, EditorResult};
use crate::poller::StatePoller;
use std::sync::Arc;
use topolab_core::{
    AttackPlan, BlockchainType, NodeId, RunState, SessionConfig, TopologyError,
    TopologyStateResponse, TxRateSample, CUSTOM_NETWORK_ENV,
};
use tracing::{info, warn};

/// Notice shown when an attack is requested for an idle topology.
pub const ATTACK_UNAVAILABLE_MESSAGE: &str = "current topology down: cannot start attack";

/// Where to open a remote shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellTarget {
    /// Node the shell was requested for
    pub node: NodeId,
    /// Backend container name
    pub container_name: String,
    /// Management port, when the backend reported one
    pub port: Option<u16>,
}

/// An editor bound to a backend.
pub struct EditorSession<C: CanvasEffects> {
    editor: TopologyEditor<C>,
    backend: Arc<dyn TopologyBackend>,
    config: SessionConfig,
    state: Option<TopologyStateResponse>,
    topology_names: Vec<String>,
    tx_rate: Option<TxRateSample>,
    channel_installed: bool,
}

impl<C: CanvasEffects> EditorSession<C> {
    /// Bind an editor to a backend.
    pub fn new(editor: TopologyEditor<C>, backend: Arc<dyn TopologyBackend>) -> Self {
        Self {
            editor,
            backend,
            config: SessionConfig::default(),
            state: None,
            topology_names: Vec::new(),
            tx_rate: None,
            channel_installed: false,
        }
    }

    /// The editor.
    pub fn editor(&self) -> &TopologyEditor<C> {
        &self.editor
    }

    /// Mutable access to the editor.
    pub fn editor_mut(&mut self) -> &mut TopologyEditor<C> {
        &mut self.editor
    }

    /// Start parameters.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mutable start parameters.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// Saved topology names last reported by the backend.
    pub fn topology_names(&self) -> &[String] {
        &self.topology_names
    }

    /// Last state applied.
    pub fn last_state(&self) -> Option<&TopologyStateResponse> {
        self.state.as_ref()
    }

    /// Latest transaction rate reading while the rate test runs.
    pub fn tx_rate(&self) -> Option<&TxRateSample> {
        self.tx_rate.as_ref()
    }

    /// Whether the transaction rate test is running.
    pub fn is_tx_rate_testing(&self) -> bool {
        self.tx_rate.is_some()
    }

    /// Whether the channel and chaincode were installed on the deployment.
    pub fn channel_installed(&self) -> bool {
        self.channel_installed
    }

    /// Fetch the backend state and apply it.
    pub async fn resume(&mut self) -> EditorResult<RunState> {
        let state = match self.backend.get_topology_state().await {
            Ok(state) => state,
            Err(err) => {
                self.editor
                    .notify(Notice::error(format!("failed to fetch topology state: {err}")));
                return Err(err.into());
            }
        };
        self.apply_state(state)
    }

    /// Mirror a backend state into the editor.
    ///
    /// A running topology replaces the graph and the start parameters. When
    /// the backend reports nothing deployed while the editor still shows a
    /// running graph, the graph is redrawn idle.
    pub fn apply_state(&mut self, state: TopologyStateResponse) -> EditorResult<RunState> {
        let run_state = match state.run_state() {
            Ok(run_state) => run_state,
            Err(err) => {
                warn!(state = %state.state, "unsupported topology state");
                self.editor.notify(Notice::error(err.to_string()));
                return Err(err.into());
            }
        };
        self.topology_names = state.all_topology_names.clone();

        match run_state {
            RunState::Up => {
                if let Some(params) = &state.topology_params {
                    self.config = params.config.clone();
                    self.editor
                        .rebuild(&params.description, true, state.links.clone());
                } else {
                    self.editor.set_running(true);
                }
            }
            RunState::Down => {
                if self.editor.is_running() {
                    let description = self.editor.serialize()?;
                    self.editor.rebuild(&description, false, None);
                }
                self.editor.set_running(false);
                self.editor.end_attack();
                self.tx_rate = None;
                self.channel_installed = false;
            }
        }
        info!(state = ?run_state, saved = self.topology_names.len(), "topology state applied");
        self.state = Some(state);
        Ok(run_state)
    }

    /// Serialize the graph and deploy it.
    ///
    /// Once the backend accepts the start the session is running. The graph
    /// is then reloaded from the backend state; if that state is not
    /// available yet, the local graph is redrawn as running instead.
    pub async fn start(&mut self) -> EditorResult<()> {
        if self.editor.is_running() {
            return Err(EditorError::TopologyRunning);
        }
        let request = match self.editor.start_request(&self.config) {
            Ok(request) => request,
            Err(err) => {
                self.editor.notify(Notice::error(err.to_string()));
                return Err(err);
            }
        };
        info!(
            nodes = request.description.nodes.len(),
            links = request.description.links.len(),
            network_env = %request.config.network_env,
            "starting topology"
        );
        if let Err(err) = self.backend.start_topology(&request).await {
            warn!(error = %err, "start failed");
            self.editor
                .notify(Notice::error(format!("failed to start topology: {err}")));
            return Err(err.into());
        }
        self.editor.set_running(true);
        self.editor.notify(Notice::success("topology started"));

        match self.backend.get_topology_state().await {
            Ok(state) if matches!(state.run_state(), Ok(RunState::Up)) => {
                if let Err(err) = self.apply_state(state) {
                    warn!(error = %err, "could not apply state after start");
                }
            }
            Ok(state) => {
                warn!(state = %state.state, "started topology not reported up yet");
                self.topology_names = state.all_topology_names;
                self.editor.rebuild(&request.description, true, None);
            }
            Err(err) => {
                warn!(error = %err, "could not fetch state after start");
                self.editor
                    .notify(Notice::error(format!("failed to fetch topology state: {err}")));
                self.editor.rebuild(&request.description, true, None);
            }
        }
        Ok(())
    }

    /// Tear down the deployed topology and redraw it idle.
    pub async fn stop(&mut self) -> EditorResult<()> {
        if !self.editor.is_running() {
            return Err(EditorError::TopologyNotRunning);
        }
        if let Err(err) = self.backend.stop_topology().await {
            warn!(error = %err, "stop failed");
            self.editor
                .notify(Notice::error(format!("failed to stop topology: {err}")));
            return Err(err.into());
        }
        let mut down = TopologyStateResponse::down();
        down.all_topology_names = self.topology_names.clone();
        self.apply_state(down)?;
        self.editor.notify(Notice::success("topology stopped"));
        Ok(())
    }

    /// Save the graph under a name.
    pub async fn save(&mut self, name: &str) -> EditorResult<()> {
        let json = self.editor.serialize()?.to_json()?;
        match self.backend.save_topology(name, &json).await {
            Ok(names) => {
                info!(name, saved = names.len(), "topology saved");
                self.topology_names = names;
                self.editor
                    .notify(Notice::success(format!("topology {name} saved")));
                Ok(())
            }
            Err(err) => {
                self.editor
                    .notify(Notice::error(format!("failed to save topology: {err}")));
                Err(err.into())
            }
        }
    }

    /// Switch to a preset or saved network environment.
    ///
    /// The blockchain family is inferred from the fetched description and
    /// the consensus protocol reset to that family's default. Choosing the
    /// custom environment keeps the current graph.
    pub async fn switch_environment(&mut self, name: &str) -> EditorResult<()> {
        if self.editor.is_running() {
            return Err(EditorError::TopologyRunning);
        }
        if name == CUSTOM_NETWORK_ENV {
            self.config.network_env = CUSTOM_NETWORK_ENV.to_string();
            return Ok(());
        }
        let description = match self.backend.topology_description(name).await {
            Ok(description) => description,
            Err(err) => {
                self.editor
                    .notify(Notice::error(format!("failed to switch topology: {err}")));
                return Err(err.into());
            }
        };
        let blockchain: BlockchainType = description.infer_blockchain();
        self.config.network_env = name.to_string();
        self.config.set_blockchain(blockchain);
        self.editor.rebuild(&description, false, None);
        info!(name, blockchain = ?blockchain, "switched network environment");
        self.editor
            .notify(Notice::success(format!("switched to topology {name}")));
        Ok(())
    }

    /// Pause one node of the deployed topology.
    pub async fn pause_node(&mut self, id: NodeId) -> EditorResult<()> {
        if !self.editor.is_running() {
            self.editor.notify(Notice::error(PAUSE_UNAVAILABLE_MESSAGE));
            return Err(EditorError::TopologyNotRunning);
        }
        let port = match self.state.as_ref().and_then(|s| s.port_for(id)) {
            Some(port) => port,
            None => {
                let err = EditorError::NoPortForNode(id);
                self.editor.notify(Notice::error(err.to_string()));
                return Err(err);
            }
        };
        match self.backend.stop_node(port).await {
            Ok(()) => {
                info!(node = %id, port, "node paused");
                self.editor.notify(Notice::success("successfully stop the node"));
                Ok(())
            }
            Err(err) => {
                self.editor.notify(Notice::error("stop node failed"));
                Err(err.into())
            }
        }
    }

    /// Turn defensive measures on or off. The backend is only told while a
    /// topology is deployed; otherwise the choice is sent with the next start.
    pub async fn set_defence(&mut self, enabled: bool) -> EditorResult<()> {
        self.config.start_defence = enabled;
        if !self.editor.is_running() {
            return Ok(());
        }
        let verb = if enabled { "enable" } else { "disable" };
        match self.backend.change_start_defence(enabled).await {
            Ok(()) => {
                self.editor
                    .notify(Notice::success(format!("defence measures {verb}d")));
                Ok(())
            }
            Err(err) => {
                self.editor
                    .notify(Notice::error(format!("failed to {verb} defence measures")));
                Err(err.into())
            }
        }
    }

    /// Launch an attack on the deployed topology. Both nodes must be part
    /// of it, and only one attack runs at a time.
    pub async fn start_attack(&mut self, plan: AttackPlan) -> EditorResult<()> {
        if !self.editor.is_running() {
            self.editor.notify(Notice::error(ATTACK_UNAVAILABLE_MESSAGE));
            return Err(EditorError::TopologyNotRunning);
        }
        if self.editor.is_attacking() {
            let err = EditorError::AttackInProgress;
            self.editor.notify(Notice::error(err.to_string()));
            return Err(err);
        }
        let topology = self.editor.topology();
        let checked = plan.check().and_then(|()| {
            [plan.attacker, plan.target]
                .into_iter()
                .find(|node| !topology.contains_node(*node))
                .map_or(Ok(()), |node| Err(TopologyError::NodeNotFound(node)))
        });
        if let Err(err) = checked {
            self.editor.notify(Notice::error(err.to_string()));
            return Err(err.into());
        }

        let request = plan.to_request();
        match self.backend.start_attack(plan.attacker.index, &request).await {
            Ok(()) => {
                info!(
                    attacker = %request.attack_node,
                    target = %request.attacked_node,
                    kind = %plan.attack_type,
                    secs = plan.duration_secs,
                    "attack launched"
                );
                self.editor.notify(Notice::success("attack launched"));
                self.editor.begin_attack(plan);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "attack failed");
                self.editor.notify(Notice::error("failed to launch attack"));
                Err(err.into())
            }
        }
    }

    /// Start the transaction rate test, or take another reading when it is
    /// already running.
    pub async fn sample_tx_rate(&mut self) -> EditorResult<&TxRateSample> {
        if !self.editor.is_running() {
            return Err(EditorError::TopologyNotRunning);
        }
        let starting = self.tx_rate.is_none();
        match self.backend.start_tx_rate_test().await {
            Ok(sample) => {
                if starting {
                    info!("transaction rate test started");
                    self.editor
                        .notify(Notice::success("transaction rate test started"));
                }
                Ok(&*self.tx_rate.insert(sample))
            }
            Err(err) => {
                let message = if starting {
                    "failed to start transaction rate test"
                } else {
                    "failed to fetch transaction rate"
                };
                self.editor.notify(Notice::error(message));
                Err(err.into())
            }
        }
    }

    /// Stop the transaction rate test and drop its readings.
    pub async fn stop_tx_rate_test(&mut self) -> EditorResult<()> {
        if self.tx_rate.is_none() {
            return Ok(());
        }
        match self.backend.stop_tx_rate_test().await {
            Ok(()) => {
                self.tx_rate = None;
                self.editor
                    .notify(Notice::success("transaction rate test stopped"));
                Ok(())
            }
            Err(err) => {
                self.editor
                    .notify(Notice::error("failed to stop transaction rate test"));
                Err(err.into())
            }
        }
    }

    /// Create the channel and install the chaincode on the deployment.
    pub async fn install_channel_and_chaincode(&mut self) -> EditorResult<()> {
        if !self.editor.is_running() {
            return Err(EditorError::TopologyNotRunning);
        }
        match self.backend.install_channel_and_chaincode().await {
            Ok(()) => {
                self.channel_installed = true;
                self.editor
                    .notify(Notice::success("channel and chaincode installed"));
                Ok(())
            }
            Err(err) => {
                self.channel_installed = false;
                self.editor
                    .notify(Notice::error("failed to install channel and chaincode"));
                Err(err.into())
            }
        }
    }

    /// Serve the requests the editor raised from its menus. Pauses go to the
    /// backend; shell requests are resolved to their targets and returned.
    pub async fn handle_requests(&mut self) -> Vec<ShellTarget> {
        let mut shells = Vec::new();
        for request in self.editor.take_requests() {
            match request {
                EditorRequest::PauseNode(id) => {
                    if let Err(err) = self.pause_node(id).await {
                        warn!(node = %id, error = %err, "pause request failed");
                    }
                }
                EditorRequest::OpenShell(id) => shells.push(ShellTarget {
                    node: id,
                    container_name: id.container_name(),
                    port: self.state.as_ref().and_then(|s| s.port_for(id)),
                }),
            }
        }
        shells
    }

    /// Start polling the backend at the editor's configured interval.
    pub fn spawn_poller(&self) -> StatePoller {
        StatePoller::spawn(
            Arc::clone(&self.backend),
            self.editor.config().state_poll_interval(),
        )
    }
}
