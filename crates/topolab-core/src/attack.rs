//! Attack and workload requests
//!
//! Experiments run against a deployed topology. An [`AttackPlan`] names the
//! attacker and the victim by node identity; [`AttackPlan::to_request`]
//! produces the wire form, which addresses both by container name.

use crate::error::{TopologyError, TopologyResult};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default number of attacking threads.
pub const DEFAULT_ATTACK_THREADS: u32 = 10;
/// Default attack duration in seconds.
pub const DEFAULT_ATTACK_DURATION_SECS: u64 = 1;

/// Kind of attack the backend can launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    /// UDP flood
    #[default]
    #[serde(rename = "udp flood attack")]
    UdpFlood,
    /// SYN flood
    #[serde(rename = "syn flood attack")]
    SynFlood,
    /// Exhaust the victim's connection table
    #[serde(rename = "connection exhausted attack")]
    ConnectionExhausted,
    /// Replay captured consensus messages
    #[serde(rename = "consensus message replay", alias = "共识消息重放")]
    ConsensusReplay,
}

impl AttackType {
    /// Every attack type, in menu order.
    pub const ALL: [AttackType; 4] = [
        AttackType::UdpFlood,
        AttackType::SynFlood,
        AttackType::ConnectionExhausted,
        AttackType::ConsensusReplay,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackType::UdpFlood => "udp flood attack",
            AttackType::SynFlood => "syn flood attack",
            AttackType::ConnectionExhausted => "connection exhausted attack",
            AttackType::ConsensusReplay => "consensus message replay",
        }
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attack as chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackPlan {
    /// Node the attack is launched from
    pub attacker: NodeId,
    /// Node under attack
    pub target: NodeId,
    /// Kind of attack
    pub attack_type: AttackType,
    /// Attacking threads
    pub thread_count: u32,
    /// Duration in seconds
    pub duration_secs: u64,
}

impl AttackPlan {
    /// A plan with the default thread count and duration.
    pub fn new(attacker: NodeId, target: NodeId, attack_type: AttackType) -> Self {
        Self {
            attacker,
            target,
            attack_type,
            thread_count: DEFAULT_ATTACK_THREADS,
            duration_secs: DEFAULT_ATTACK_DURATION_SECS,
        }
    }

    /// Set the thread count.
    pub fn with_threads(mut self, thread_count: u32) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Set the duration in seconds.
    pub fn with_duration_secs(mut self, duration_secs: u64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    /// How long the attack lasts.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Reject plans the backend cannot run.
    pub fn check(&self) -> TopologyResult<()> {
        if self.attacker == self.target {
            return Err(TopologyError::invalid_attack(format!(
                "{} cannot attack itself",
                self.attacker
            )));
        }
        if self.thread_count == 0 {
            return Err(TopologyError::invalid_attack("thread count must be positive"));
        }
        if self.duration_secs == 0 {
            return Err(TopologyError::invalid_attack("duration must be positive"));
        }
        Ok(())
    }

    /// Wire form addressed by container name.
    pub fn to_request(&self) -> AttackRequest {
        AttackRequest {
            attack_thread_count: self.thread_count,
            attack_type: self.attack_type,
            attack_node: self.attacker.container_name(),
            attacked_node: self.target.container_name(),
            attack_duration: self.duration_secs,
        }
    }
}

/// Body of the attack request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRequest {
    /// Attacking threads
    pub attack_thread_count: u32,
    /// Kind of attack
    pub attack_type: AttackType,
    /// Attacker container name
    pub attack_node: String,
    /// Victim container name
    pub attacked_node: String,
    /// Duration in seconds
    pub attack_duration: u64,
}

/// One reading of the transaction rate test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxRateSample {
    /// Sample times, as labelled by the backend
    #[serde(default)]
    pub time_list: Vec<String>,
    /// Transactions per second at each sample time
    #[serde(default)]
    pub rate_list: Vec<f64>,
}

impl TxRateSample {
    /// Most recent rate, if any was reported.
    pub fn latest_rate(&self) -> Option<f64> {
        self.rate_list.last().copied()
    }
}
