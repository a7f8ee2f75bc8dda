//! Topology editor
//!
//! [`TopologyEditor`] owns one topology model, the surface it is drawn on
//! and the queue of deferred work. Every operator gesture arrives either as
//! a direct call or as a raw surface event handled in [`TopologyEditor::turn`].
//!
//! A turn runs in three steps:
//! 1. due deferred commands run
//! 2. raw surface events are dispatched (edge validation happens here)
//! 3. the surface settles
//!
//! Refused edges are retracted by a command queued for the next turn,
//! never from inside the dispatch that announced them. The end of a
//! launched attack is queued the same way, on the editor's clock.

use crate::canvas::{
    CanvasEffects, CanvasEvent, EdgeId, EdgeMenuAction, EdgeStyle, NodeMenuAction, NodeVisual,
};
use crate::config::EditorConfig;
use crate::error::{CanvasError, EditorError, EditorResult};
use crate::queue::{CommandQueue, Deferred, EditorCommand};
use crate::rebuild::{self, PendingLinks, RebuildReport};
use crate::serializer;
use crate::validator::validate_new_edge;
use std::str::FromStr;
use std::time::Duration;
use topolab_core::{
    AttackPlan, LinkParameterLookup, LinkType, NodeId, NodeType, SessionConfig, StartRequest,
    Topology, TopologyDescription,
};
use tracing::{debug, info, warn};

/// Notice shown when a shell is requested for an idle topology.
pub const SHELL_UNAVAILABLE_MESSAGE: &str = "still cannot create webshell";
/// Notice shown when a pause is requested for an idle topology.
pub const PAUSE_UNAVAILABLE_MESSAGE: &str = "current topology down: cannot pause node";

const MAX_IDLE_TURNS: usize = 1024;

/// Severity of an operator notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// An operation completed
    Success,
    /// Informational
    Info,
    /// An operation was refused or failed
    Error,
}

/// Operator-facing toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text
    pub message: String,
}

impl Notice {
    /// Success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Work the editor hands to its session because it needs the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorRequest {
    /// Open a remote shell on a node's container
    OpenShell(NodeId),
    /// Pause a node's container
    PauseNode(NodeId),
}

/// Interactive editor over one topology.
#[derive(Debug)]
pub struct TopologyEditor<C: CanvasEffects> {
    topology: Topology,
    canvas: C,
    queue: CommandQueue,
    config: EditorConfig,
    running: bool,
    link_type: LinkType,
    node_type: NodeType,
    notices: Vec<Notice>,
    requests: Vec<EditorRequest>,
    generation: u64,
    pending_links: Option<PendingLinks>,
    last_rebuild: Option<RebuildReport>,
    attack: Option<(u64, AttackPlan)>,
    attack_seq: u64,
}

impl<C: CanvasEffects> TopologyEditor<C> {
    /// Create an editor drawing on `canvas`.
    pub fn new(mut canvas: C, config: EditorConfig) -> Self {
        canvas.attach_context_menus(&NodeMenuAction::ALL, &EdgeMenuAction::ALL);
        canvas.set_default_edge_style(
            EdgeStyle::for_link_type(config.default_link_type),
            config.default_link_type,
        );
        Self {
            topology: Topology::new(),
            canvas,
            queue: CommandQueue::new(),
            link_type: config.default_link_type,
            node_type: config.default_node_type,
            config,
            running: false,
            notices: Vec::new(),
            requests: Vec::new(),
            generation: 0,
            pending_links: None,
            last_rebuild: None,
            attack: None,
            attack_seq: 0,
        }
    }

    /// The topology model.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The surface.
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Mutable access to the surface, for driving operator gestures.
    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Editor configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Pending deferred work.
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Whether the described topology is deployed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Record whether the described topology is deployed. Structural edits
    /// are refused while it is.
    pub fn set_running(&mut self, running: bool) {
        if self.running != running {
            info!(running, "editor running state changed");
        }
        self.running = running;
    }

    /// Link type given to newly drawn edges.
    pub fn selected_link_type(&self) -> LinkType {
        self.link_type
    }

    /// Node type placed by [`add_node_at_center`](Self::add_node_at_center).
    pub fn selected_node_type(&self) -> NodeType {
        self.node_type
    }

    /// Choose the link type (and line style) for newly drawn edges.
    pub fn select_link_type(&mut self, link_type: LinkType) {
        self.link_type = link_type;
        self.canvas
            .set_default_edge_style(EdgeStyle::for_link_type(link_type), link_type);
    }

    /// Choose the node type placed at the center.
    pub fn select_node_type(&mut self, node_type: NodeType) {
        self.node_type = node_type;
    }

    /// Place a new node.
    pub fn add_node(&mut self, node_type: NodeType, x: f64, y: f64) -> EditorResult<NodeId> {
        self.ensure_editable()?;
        let node = self.topology.add_node(node_type, x, y)?;
        let id = node.id();
        if let Err(err) = self.canvas.add_node(NodeVisual::for_node(&node, self.running)) {
            let _ = self.topology.remove_node(id);
            return Err(err.into());
        }
        Ok(id)
    }

    /// Place a node of the selected type at the center of the drawing area.
    pub fn add_node_at_center(&mut self) -> EditorResult<NodeId> {
        let (x, y) = self.config.canvas_center();
        self.add_node(self.node_type, x, y)
    }

    /// Delete a node and its links.
    pub fn remove_node(&mut self, id: NodeId) -> EditorResult<()> {
        self.ensure_editable()?;
        let (_, links) = self.topology.remove_node(id)?;
        match self.canvas.remove_node(&id.to_string()) {
            Ok(_) | Err(CanvasError::NodeNotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
        info!(node = %id, links = links.len(), "node deleted");
        Ok(())
    }

    /// Delete a drawn edge and its link.
    pub fn remove_edge(&mut self, edge: EdgeId) -> EditorResult<()> {
        self.ensure_editable()?;
        let removed = self.canvas.remove_edge(edge)?;
        if let (Ok(a), Ok(b)) = (
            NodeId::from_str(&removed.source),
            NodeId::from_str(&removed.target),
        ) {
            self.topology.remove_link(a, b);
        }
        info!(%edge, source = %removed.source, target = %removed.target, "edge deleted");
        Ok(())
    }

    /// Process one turn. Returns how many commands and events were handled.
    pub fn turn(&mut self) -> usize {
        let commands = self.queue.take_due();
        let handled_commands = commands.len();
        for command in commands {
            self.run_command(command);
        }

        let events = self.canvas.take_events();
        let handled_events = events.len();
        for event in events {
            self.dispatch(event);
        }

        self.canvas.settle();
        handled_commands + handled_events
    }

    /// Finish the current turn, move the clock forward and process another.
    pub fn advance(&mut self, by: Duration) -> usize {
        let handled = self.turn();
        self.queue.advance(by);
        handled + self.turn()
    }

    /// Turn until no work is left, advancing the clock to each pending
    /// deadline. Returns the total clock advance.
    pub fn run_until_idle(&mut self) -> Duration {
        let start = self.queue.now();
        for _ in 0..MAX_IDLE_TURNS {
            if self.turn() > 0 {
                continue;
            }
            match self.queue.next_due() {
                Some(due) => {
                    let now = self.queue.now();
                    self.queue.advance(due.saturating_sub(now));
                }
                None => break,
            }
        }
        self.queue.now() - start
    }

    /// Canonical description of what is drawn.
    pub fn serialize(&self) -> EditorResult<TopologyDescription> {
        serializer::serialize(&self.canvas)
    }

    /// Start payload for the drawn topology; refuses an empty one.
    pub fn start_request(&self, config: &SessionConfig) -> EditorResult<StartRequest> {
        serializer::start_request(&self.canvas, config)
    }

    /// Replace the graph with `description`.
    ///
    /// Nodes are drawn at once, in the running or idle color. Links follow
    /// after the configured delay; drive the editor with [`advance`](Self::advance)
    /// or [`run_until_idle`](Self::run_until_idle) to create them. A newer
    /// rebuild supersedes a pending link phase.
    pub fn rebuild(
        &mut self,
        description: &TopologyDescription,
        running: bool,
        lookup: Option<LinkParameterLookup>,
    ) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        self.running = running;
        // Retractions, deletions and unhandled gestures refer to the graph
        // being replaced.
        self.queue.cancel_where(|c| {
            matches!(c, EditorCommand::RetractEdge(_) | EditorCommand::RemoveNode(_))
        });
        let stale = self.canvas.take_events().len();
        if stale > 0 {
            debug!(generation, events = stale, "dropped surface events of the replaced graph");
        }

        let mut report = RebuildReport {
            generation,
            running,
            links_pending: true,
            ..Default::default()
        };
        info!(
            generation,
            running,
            nodes = description.nodes.len(),
            links = description.links.len(),
            "rebuild started"
        );
        rebuild::build_nodes(&mut self.topology, &mut self.canvas, description, &mut report);

        self.pending_links = Some(PendingLinks {
            generation,
            links: description.links.clone(),
            lookup,
        });
        self.queue.schedule(
            Deferred::After(self.config.rebuild_link_delay()),
            EditorCommand::CreateRebuildLinks { generation },
        );
        self.last_rebuild = Some(report);
        generation
    }

    /// Report of the most recent rebuild.
    pub fn last_rebuild(&self) -> Option<&RebuildReport> {
        self.last_rebuild.as_ref()
    }

    /// Pretty JSON of the drawn topology, the export file format.
    pub fn export_json(&self) -> EditorResult<String> {
        Ok(self.serialize()?.to_json_pretty()?)
    }

    /// Rebuild from an exported document.
    pub fn import_json(&mut self, text: &str) -> EditorResult<u64> {
        self.ensure_editable()?;
        let description = TopologyDescription::from_json(text)?;
        Ok(self.rebuild(&description, false, None))
    }

    /// Record a launched attack. It counts as in progress until its
    /// duration has elapsed on the editor clock.
    pub fn begin_attack(&mut self, plan: AttackPlan) {
        self.attack_seq += 1;
        let attack = self.attack_seq;
        self.attack = Some((attack, plan));
        self.queue.schedule(
            Deferred::After(plan.duration()),
            EditorCommand::EndAttack { attack },
        );
        info!(
            attacker = %plan.attacker,
            target = %plan.target,
            kind = %plan.attack_type,
            "attack in progress"
        );
    }

    /// The attack in progress, if any.
    pub fn current_attack(&self) -> Option<&AttackPlan> {
        self.attack.as_ref().map(|(_, plan)| plan)
    }

    /// Whether an attack is in progress.
    pub fn is_attacking(&self) -> bool {
        self.attack.is_some()
    }

    /// Forget the attack in progress without a notice.
    pub fn end_attack(&mut self) {
        self.attack = None;
    }

    /// Drain operator notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Drain requests that need the backend.
    pub fn take_requests(&mut self) -> Vec<EditorRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Queue an operator notice.
    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn ensure_editable(&self) -> EditorResult<()> {
        if self.running {
            Err(EditorError::TopologyRunning)
        } else {
            Ok(())
        }
    }

    fn run_command(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::RetractEdge(edge) => match self.canvas.remove_edge(edge) {
                Ok(_) => debug!(%edge, "refused edge retracted"),
                Err(err) => warn!(%edge, error = %err, "could not retract edge"),
            },
            EditorCommand::RemoveNode(id) => match self.remove_node(id) {
                Ok(()) => self.notify(Notice::success(format!("node {id} deleted"))),
                Err(err) => self.notify(Notice::error(err.to_string())),
            },
            EditorCommand::CreateRebuildLinks { generation } => {
                let pending = match self.pending_links.take() {
                    Some(pending) if pending.generation == generation => pending,
                    other => {
                        self.pending_links = other;
                        debug!(generation, "dropping stale rebuild link phase");
                        return;
                    }
                };
                let mut report = match self.last_rebuild.take() {
                    Some(report) if report.generation == generation => report,
                    _ => RebuildReport {
                        generation,
                        running: self.running,
                        ..Default::default()
                    },
                };
                rebuild::build_links(&mut self.topology, &mut self.canvas, &pending, &mut report);
                self.last_rebuild = Some(report);
            }
            EditorCommand::EndAttack { attack } => match self.attack {
                Some((current, plan)) if current == attack => {
                    self.attack = None;
                    info!(attacker = %plan.attacker, target = %plan.target, "attack finished");
                    self.notify(Notice::success("attack finished"));
                }
                _ => debug!(attack, "attack already ended"),
            },
        }
    }

    fn dispatch(&mut self, event: CanvasEvent) {
        match event {
            CanvasEvent::EdgeCreated {
                edge,
                source,
                target,
            } => self.on_edge_created(edge, &source, &target),
            CanvasEvent::NodeMoved { id, x, y } => {
                if let Ok(node) = NodeId::from_str(&id) {
                    if let Err(err) = self.topology.move_node(node, x, y) {
                        warn!(node = %id, error = %err, "moved node is not in the model");
                    }
                }
            }
            CanvasEvent::NodeMenu { node, action } => self.on_node_menu(&node, action),
            CanvasEvent::EdgeMenu { edge, action } => match action {
                EdgeMenuAction::DeleteEdge => {
                    if let Err(err) = self.remove_edge(edge) {
                        self.notify(Notice::error(err.to_string()));
                    }
                }
            },
        }
    }

    fn on_edge_created(&mut self, edge: EdgeId, source: &str, target: &str) {
        if self.canvas.edge(edge).is_none() {
            debug!(%edge, "created edge is gone; ignoring");
            return;
        }
        let verdict = validate_new_edge(&self.canvas, edge, source, target);
        if !verdict.is_accepted() {
            for rejection in &verdict.rejections {
                warn!(%edge, source, target, reason = %rejection, "edge refused");
                self.notify(Notice::error(rejection.message()));
            }
            self.retract(edge);
            return;
        }

        if self.running {
            self.notify(Notice::error(EditorError::TopologyRunning.to_string()));
            self.retract(edge);
            return;
        }

        let link_type = self
            .canvas
            .edge(edge)
            .and_then(|e| e.link_type)
            .unwrap_or(self.link_type);
        let accepted = NodeId::from_str(source)
            .and_then(|a| Ok((a, NodeId::from_str(target)?)))
            .and_then(|(a, b)| self.topology.add_link(a, b, link_type));
        match accepted {
            Ok(record) => info!(
                %edge,
                source = %record.source,
                target = %record.target,
                %link_type,
                "edge accepted"
            ),
            Err(err) => {
                warn!(%edge, error = %err, "edge refused by the model");
                self.notify(Notice::error(err.to_string()));
                self.retract(edge);
            }
        }
    }

    fn on_node_menu(&mut self, node: &str, action: NodeMenuAction) {
        let id = match NodeId::from_str(node) {
            Ok(id) => id,
            Err(err) => {
                self.notify(Notice::error(err.to_string()));
                return;
            }
        };
        match action {
            NodeMenuAction::OpenShell => {
                if self.running {
                    self.requests.push(EditorRequest::OpenShell(id));
                } else {
                    self.notify(Notice::error(SHELL_UNAVAILABLE_MESSAGE));
                }
            }
            NodeMenuAction::DeleteNode => {
                if self.running {
                    self.notify(Notice::error(EditorError::TopologyRunning.to_string()));
                } else {
                    self.queue
                        .schedule(Deferred::NextTurn, EditorCommand::RemoveNode(id));
                }
            }
            NodeMenuAction::PauseNode => {
                if self.running {
                    self.requests.push(EditorRequest::PauseNode(id));
                } else {
                    self.notify(Notice::error(PAUSE_UNAVAILABLE_MESSAGE));
                }
            }
        }
    }

    fn retract(&mut self, edge: EdgeId) {
        self.queue
            .schedule(Deferred::NextTurn, EditorCommand::RetractEdge(edge));
    }
}
