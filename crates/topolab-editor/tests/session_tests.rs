//! Session Tests
//!
//! Session orchestration against the mock backend: resume, start, stop,
//! save, environment switching, node pause, defence toggling, attacks, the
//! transaction rate test and the background state poll.

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use std::sync::Arc;
use std::time::Duration;
use topolab_core::{
    AttackPlan, AttackType, BlockchainType, LinkType, NodeId, NodeType, RunState, SessionConfig,
    StartRequest, TopologyError, TopologyStateResponse,
};
use topolab_editor::canvas::RUNNING_LABEL_FILL;
use topolab_editor::editor::PAUSE_UNAVAILABLE_MESSAGE;
use topolab_editor::session::ATTACK_UNAVAILABLE_MESSAGE;
use topolab_editor::{
    BackendError, CanvasEffects, EditorConfig, EditorError, EditorSession, MemoryCanvas,
    NodeMenuAction, Notice, NoticeLevel, TopologyBackend,
};
use topolab_testkit::{
    chainmaker_network, fabric_network, init_test_tracing, lookup_for, memory_editor,
    router_pair, BackendCall, MockBackend,
};

fn session(backend: &MockBackend) -> EditorSession<MemoryCanvas> {
    init_test_tracing();
    EditorSession::new(memory_editor(), Arc::new(backend.clone()))
}

fn last_notice(session: &mut EditorSession<MemoryCanvas>) -> Notice {
    session.editor_mut().take_notices().pop().unwrap()
}

#[tokio::test]
async fn test_resume_idle_backend() {
    let backend = MockBackend::new().with_preset("ring", router_pair());
    let mut session = session(&backend);
    assert_eq!(session.resume().await.unwrap(), RunState::Down);
    assert!(!session.editor().is_running());
    assert_eq!(session.topology_names(), &["ring".to_string()]);
    assert!(session.editor().topology().is_empty());
}

#[tokio::test]
async fn test_resume_running_topology() {
    let description = chainmaker_network();
    let mut config = SessionConfig::default();
    config.consensus_type = "RAFT".to_string();
    let backend = MockBackend::new()
        .with_running(StartRequest::new(config, description.clone()))
        .with_links(lookup_for(&description));
    let mut session = session(&backend);

    assert_eq!(session.resume().await.unwrap(), RunState::Up);
    session.editor_mut().run_until_idle();

    let editor = session.editor();
    assert!(editor.is_running());
    assert_eq!(session.config().consensus_type, "RAFT");
    assert_eq!(editor.topology().total_node_count(), 6);
    assert_eq!(editor.topology().link_count(), 5);
    assert_eq!(editor.last_rebuild().unwrap().labeled_links, 5);
    assert!(editor
        .canvas()
        .nodes()
        .iter()
        .all(|n| n.label_fill == RUNNING_LABEL_FILL));
}

#[tokio::test]
async fn test_start_sends_canvas_and_resumes() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    session.editor_mut().rebuild(&router_pair(), false, None);
    session.editor_mut().run_until_idle();
    session.config_mut().start_defence = true;

    session.start().await.unwrap();
    session.editor_mut().run_until_idle();

    let started = backend.running().unwrap();
    assert_eq!(started.description.nodes.len(), 2);
    assert_eq!(started.description.links[0].link_type, LinkType::Backbone);
    assert!(started.config.start_defence);
    assert!(session.editor().is_running());
    assert_eq!(session.editor().topology().link_count(), 1);
    assert_eq!(
        backend.commands(),
        vec![BackendCall::Start(started.clone())]
    );
}

#[tokio::test]
async fn test_start_empty_topology_is_refused_locally() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    assert_matches!(
        session.start().await,
        Err(EditorError::Topology(TopologyError::EmptyTopology))
    );
    assert!(backend.calls().is_empty());
    let notice = last_notice(&mut session);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("at least one node"));
}

#[tokio::test]
async fn test_start_failure_leaves_model_untouched() {
    let backend = MockBackend::new().failing("start");
    let mut session = session(&backend);
    session.editor_mut().rebuild(&router_pair(), false, None);
    session.editor_mut().run_until_idle();
    let before = session.editor().serialize().unwrap();

    assert_matches!(
        session.start().await,
        Err(EditorError::Backend(BackendError::Rejected { .. }))
    );
    assert!(!session.editor().is_running());
    assert_eq!(session.editor().serialize().unwrap(), before);
    assert_eq!(last_notice(&mut session).level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_stop_redraws_idle() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    session.editor_mut().rebuild(&router_pair(), false, None);
    session.editor_mut().run_until_idle();
    session.start().await.unwrap();
    session.editor_mut().run_until_idle();

    session.stop().await.unwrap();
    session.editor_mut().run_until_idle();
    assert!(!session.editor().is_running());
    assert!(backend.running().is_none());
    assert_eq!(session.editor().topology().link_count(), 1);
    assert!(session
        .editor()
        .canvas()
        .nodes()
        .iter()
        .all(|n| n.label_fill != RUNNING_LABEL_FILL));

    assert_matches!(session.stop().await, Err(EditorError::TopologyNotRunning));
}

#[tokio::test]
async fn test_stop_failure_keeps_running() {
    let backend = MockBackend::new().with_running(StartRequest::new(
        SessionConfig::default(),
        router_pair(),
    ));
    let backend = backend.failing("stop");
    let mut session = session(&backend);
    session.resume().await.unwrap();

    assert!(session.stop().await.is_err());
    assert!(session.editor().is_running());
    assert!(backend.running().is_some());
}

#[tokio::test]
async fn test_save_updates_names() {
    let backend = MockBackend::new().with_preset("alpha", router_pair());
    let mut session = session(&backend);
    session.editor_mut().rebuild(&fabric_network(), false, None);
    session.editor_mut().run_until_idle();

    session.save("fabric-lab").await.unwrap();
    assert_eq!(
        session.topology_names(),
        &["alpha".to_string(), "fabric-lab".to_string()]
    );
    assert_eq!(last_notice(&mut session).level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_switch_environment_infers_blockchain() {
    let backend = MockBackend::new()
        .with_preset("fabric-lab", fabric_network())
        .with_preset("chainmaker-lab", chainmaker_network());
    let mut session = session(&backend);

    session.switch_environment("fabric-lab").await.unwrap();
    session.editor_mut().run_until_idle();
    assert_eq!(session.config().network_env, "fabric-lab");
    assert_eq!(session.config().blockchain_type, BlockchainType::Fabric);
    assert_eq!(session.config().consensus_type, "BFT-SMaRt");
    assert_eq!(session.editor().topology().total_node_count(), 4);

    session.switch_environment("chainmaker-lab").await.unwrap();
    session.editor_mut().run_until_idle();
    assert_eq!(session.config().blockchain_type, BlockchainType::ChainMaker);
    assert_eq!(session.config().consensus_type, "TBFT");
    assert_eq!(session.editor().topology().total_node_count(), 6);

    assert!(session.switch_environment("missing").await.is_err());
    assert_eq!(session.editor().topology().total_node_count(), 6);
}

#[tokio::test]
async fn test_pause_node_uses_container_port() {
    let backend = MockBackend::new().with_running(StartRequest::new(
        SessionConfig::default(),
        router_pair(),
    ));
    let mut session = session(&backend);
    session.resume().await.unwrap();
    session.editor_mut().run_until_idle();

    let r2 = NodeId::new(NodeType::Router, 2);
    session
        .editor_mut()
        .canvas_mut()
        .click_node_menu(&r2.to_string(), NodeMenuAction::PauseNode)
        .unwrap();
    session
        .editor_mut()
        .canvas_mut()
        .click_node_menu(&r2.to_string(), NodeMenuAction::OpenShell)
        .unwrap();
    session.editor_mut().turn();
    let shells = session.handle_requests().await;

    let port = backend.port_of("Router-2").unwrap();
    assert_eq!(backend.commands(), vec![BackendCall::StopNode(port)]);
    assert_eq!(shells.len(), 1);
    assert_eq!(shells[0].container_name, "Router-2");
    assert_eq!(shells[0].port, Some(port));
}

#[tokio::test]
async fn test_pause_refused_while_down() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    assert_matches!(
        session.pause_node(NodeId::new(NodeType::Router, 1)).await,
        Err(EditorError::TopologyNotRunning)
    );
    assert_eq!(
        last_notice(&mut session),
        Notice::error(PAUSE_UNAVAILABLE_MESSAGE)
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_defence_forwarded_only_while_running() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    session.set_defence(true).await.unwrap();
    assert!(session.config().start_defence);
    assert!(backend.calls().is_empty());

    session.editor_mut().rebuild(&router_pair(), false, None);
    session.editor_mut().run_until_idle();
    session.start().await.unwrap();
    assert!(backend.defence());

    session.set_defence(false).await.unwrap();
    assert!(!backend.defence());
    assert_eq!(
        backend.commands().last(),
        Some(&BackendCall::ChangeDefence(false))
    );
}

#[tokio::test]
async fn test_poller_publishes_changes_and_cancels() {
    let backend = MockBackend::new();
    let config = EditorConfig {
        state_poll_interval_ms: 10,
        ..EditorConfig::default()
    };
    let session = EditorSession::new(
        topolab_editor::TopologyEditor::new(MemoryCanvas::new(), config),
        Arc::new(backend.clone()),
    );
    let poller = session.spawn_poller();
    let mut updates = poller.subscribe();

    updates.changed().await.unwrap();
    assert_eq!(poller.run_state(), Some(RunState::Down));

    backend
        .start_topology(&StartRequest::new(SessionConfig::default(), router_pair()))
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(2), updates.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(poller.run_state(), Some(RunState::Up));

    poller.cancel();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(poller.is_finished());
}

fn running_session(backend: &MockBackend) -> EditorSession<MemoryCanvas> {
    let mut session = session(backend);
    session.editor_mut().rebuild(&router_pair(), false, None);
    session.editor_mut().run_until_idle();
    session
}

#[tokio::test]
async fn test_start_is_running_even_when_state_fetch_fails() {
    let backend = MockBackend::new().failing("state");
    let mut session = running_session(&backend);

    session.start().await.unwrap();
    session.editor_mut().run_until_idle();

    assert!(backend.running().is_some());
    assert!(session.editor().is_running());
    assert_eq!(session.editor().topology().link_count(), 1);
    assert!(session
        .editor()
        .canvas()
        .nodes()
        .iter()
        .all(|n| n.label_fill == RUNNING_LABEL_FILL));
    let notices = session.editor_mut().take_notices();
    assert_eq!(notices[0], Notice::success("topology started"));
    assert_eq!(notices[1].level, NoticeLevel::Error);

    // Already running: a second start never reaches the backend.
    assert_matches!(session.start().await, Err(EditorError::TopologyRunning));
    let starts = backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, BackendCall::Start(_)))
        .count();
    assert_eq!(starts, 1);
}

#[tokio::test]
async fn test_unsupported_state_is_reported() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    let state = TopologyStateResponse {
        state: "paused".to_string(),
        ..TopologyStateResponse::down()
    };

    assert_matches!(
        session.apply_state(state),
        Err(EditorError::Topology(TopologyError::UnsupportedState(_)))
    );
    let notice = last_notice(&mut session);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("unsupported topology state"));
    assert!(session.last_state().is_none());
}

#[tokio::test]
async fn test_attack_translates_to_container_names() {
    let backend = MockBackend::new();
    let mut session = running_session(&backend);
    session.start().await.unwrap();
    session.editor_mut().run_until_idle();
    session.editor_mut().take_notices();

    let attacker = NodeId::new(NodeType::Router, 1);
    let target = NodeId::new(NodeType::Router, 2);
    let plan = AttackPlan::new(attacker, target, AttackType::SynFlood)
        .with_threads(4)
        .with_duration_secs(3);
    session.start_attack(plan).await.unwrap();

    assert_matches!(
        backend.commands().last(),
        Some(BackendCall::Attack { attacker_index: 1, request })
            if request.attack_node == "Router-1"
                && request.attacked_node == "Router-2"
                && request.attack_thread_count == 4
                && request.attack_duration == 3
    );
    assert_eq!(session.editor().current_attack(), Some(&plan));
    assert_matches!(
        session.start_attack(plan).await,
        Err(EditorError::AttackInProgress)
    );

    session.editor_mut().advance(Duration::from_secs(3));
    assert!(!session.editor().is_attacking());
    assert_eq!(last_notice(&mut session), Notice::success("attack finished"));
    session.start_attack(plan).await.unwrap();
}

#[tokio::test]
async fn test_attack_is_checked_before_sending() {
    let backend = MockBackend::new();
    let mut session = running_session(&backend);
    let r1 = NodeId::new(NodeType::Router, 1);
    let r2 = NodeId::new(NodeType::Router, 2);

    assert_matches!(
        session
            .start_attack(AttackPlan::new(r1, r2, AttackType::UdpFlood))
            .await,
        Err(EditorError::TopologyNotRunning)
    );
    assert_eq!(
        last_notice(&mut session),
        Notice::error(ATTACK_UNAVAILABLE_MESSAGE)
    );

    session.start().await.unwrap();
    session.editor_mut().run_until_idle();
    assert_matches!(
        session
            .start_attack(AttackPlan::new(r1, r1, AttackType::UdpFlood))
            .await,
        Err(EditorError::Topology(TopologyError::InvalidAttack(_)))
    );
    let stranger = NodeId::new(NodeType::MaliciousNode, 1);
    assert_matches!(
        session
            .start_attack(AttackPlan::new(stranger, r2, AttackType::UdpFlood))
            .await,
        Err(EditorError::Topology(TopologyError::NodeNotFound(_)))
    );
    assert!(!backend
        .calls()
        .iter()
        .any(|c| matches!(c, BackendCall::Attack { .. })));
}

#[tokio::test]
async fn test_attack_failure_is_not_in_progress() {
    let backend = MockBackend::new().failing("attack");
    let mut session = running_session(&backend);
    session.start().await.unwrap();
    let plan = AttackPlan::new(
        NodeId::new(NodeType::Router, 1),
        NodeId::new(NodeType::Router, 2),
        AttackType::ConnectionExhausted,
    );
    assert!(session.start_attack(plan).await.is_err());
    assert!(!session.editor().is_attacking());
    assert_eq!(
        last_notice(&mut session),
        Notice::error("failed to launch attack")
    );
}

#[tokio::test]
async fn test_tx_rate_test_and_chaincode() {
    let backend = MockBackend::new();
    let mut session = running_session(&backend);
    assert_matches!(
        session.sample_tx_rate().await,
        Err(EditorError::TopologyNotRunning)
    );

    session.start().await.unwrap();
    session.editor_mut().take_notices();
    session.sample_tx_rate().await.unwrap();
    let latest = session.sample_tx_rate().await.unwrap().latest_rate();
    assert_eq!(latest, Some(200.0));
    assert!(session.is_tx_rate_testing());
    assert_eq!(
        session.editor_mut().take_notices(),
        vec![Notice::success("transaction rate test started")]
    );

    session.stop_tx_rate_test().await.unwrap();
    assert!(session.tx_rate().is_none());

    session.install_channel_and_chaincode().await.unwrap();
    assert!(session.channel_installed());
    session.stop().await.unwrap();
    assert!(!session.channel_installed());
}
