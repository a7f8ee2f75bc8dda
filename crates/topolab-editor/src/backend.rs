//! Backend service interface
//!
//! The operations the editor session needs from the service that actually
//! deploys topologies. Transport is not this crate's concern: an HTTP
//! client, an in-process mock or a recorded fixture can all implement
//! [`TopologyBackend`].

use crate::error::BackendError;
use async_trait::async_trait;
use topolab_core::{
    AttackRequest, StartRequest, TopologyDescription, TopologyStateResponse, TxRateSample,
};

/// Topology deployment service.
#[async_trait]
pub trait TopologyBackend: Send + Sync {
    /// Deploy a topology.
    async fn start_topology(&self, request: &StartRequest) -> Result<(), BackendError>;

    /// Tear down the deployed topology.
    async fn stop_topology(&self) -> Result<(), BackendError>;

    /// Current deployment state.
    async fn get_topology_state(&self) -> Result<TopologyStateResponse, BackendError>;

    /// Store a description under a name. `description_json` is the compact
    /// JSON form. Returns every saved name.
    async fn save_topology(
        &self,
        name: &str,
        description_json: &str,
    ) -> Result<Vec<String>, BackendError>;

    /// Fetch a saved or preset description by name.
    async fn topology_description(&self, name: &str) -> Result<TopologyDescription, BackendError>;

    /// Pause the container listening on a management port.
    async fn stop_node(&self, port: u16) -> Result<(), BackendError>;

    /// Enable or disable defensive measures on the deployed topology.
    async fn change_start_defence(&self, enabled: bool) -> Result<(), BackendError>;

    /// Launch an attack from the node with index `attacker_index`.
    async fn start_attack(
        &self,
        attacker_index: u32,
        request: &AttackRequest,
    ) -> Result<(), BackendError>;

    /// Start (or keep sampling) the transaction rate test and return the
    /// latest readings.
    async fn start_tx_rate_test(&self) -> Result<TxRateSample, BackendError>;

    /// Stop the transaction rate test.
    async fn stop_tx_rate_test(&self) -> Result<(), BackendError>;

    /// Create the channel and install the chaincode on a Fabric topology.
    async fn install_channel_and_chaincode(&self) -> Result<(), BackendError>;
}
