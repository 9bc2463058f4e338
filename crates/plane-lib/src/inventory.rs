//! Inventory collaborators
//!
//! Traits over the inventory services the plane consumes (clusters, assets,
//! edge controllers) plus the gRPC-backed implementation. The traits keep
//! the resolver and manager testable with in-memory fixtures.

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};

use crate::error::PlaneError;
use crate::proto::monitoring::v1 as pb;
use crate::proto::{AssetsClient, ClustersClient, ControllersClient};

/// Deadline applied to every inventory call.
pub const INVENTORY_DEADLINE: Duration = Duration::from_secs(30);

#[async_trait]
pub trait ClusterInventory: Send + Sync {
    async fn get_cluster(
        &self,
        organization_id: &str,
        cluster_id: &str,
    ) -> Result<pb::Cluster, PlaneError>;

    async fn list_clusters(&self, organization_id: &str) -> Result<Vec<pb::Cluster>, PlaneError>;
}

#[async_trait]
pub trait AssetInventory: Send + Sync {
    async fn get(&self, organization_id: &str, asset_id: &str) -> Result<pb::Asset, PlaneError>;

    async fn list(&self, organization_id: &str) -> Result<Vec<pb::Asset>, PlaneError>;

    async fn list_controller_assets(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
    ) -> Result<Vec<pb::Asset>, PlaneError>;
}

#[async_trait]
pub trait ControllerInventory: Send + Sync {
    async fn list(&self, organization_id: &str) -> Result<Vec<pb::EdgeController>, PlaneError>;
}

/// Inventory backed by the system model gRPC service. The channel is
/// long-lived and shared; tonic clients are cheap per-call clones.
#[derive(Clone)]
pub struct GrpcInventory {
    channel: Channel,
}

impl GrpcInventory {
    /// Connect lazily to the inventory endpoint.
    pub fn new(endpoint: &str) -> Result<Self, PlaneError> {
        let channel = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| {
                PlaneError::invalid_argument(format!("invalid inventory endpoint: {}", e))
            })?
            .timeout(INVENTORY_DEADLINE)
            .connect_lazy();
        Ok(GrpcInventory { channel })
    }
}

#[async_trait]
impl ClusterInventory for GrpcInventory {
    async fn get_cluster(
        &self,
        organization_id: &str,
        cluster_id: &str,
    ) -> Result<pb::Cluster, PlaneError> {
        let mut client = ClustersClient::new(self.channel.clone());
        let response = client
            .get_cluster(pb::ClusterId {
                organization_id: organization_id.to_string(),
                cluster_id: cluster_id.to_string(),
            })
            .await?;
        Ok(response.into_inner())
    }

    async fn list_clusters(&self, organization_id: &str) -> Result<Vec<pb::Cluster>, PlaneError> {
        let mut client = ClustersClient::new(self.channel.clone());
        let response = client
            .list_clusters(pb::OrganizationId {
                organization_id: organization_id.to_string(),
            })
            .await?;
        Ok(response.into_inner().clusters)
    }
}

#[async_trait]
impl AssetInventory for GrpcInventory {
    async fn get(&self, organization_id: &str, asset_id: &str) -> Result<pb::Asset, PlaneError> {
        let mut client = AssetsClient::new(self.channel.clone());
        let response = client
            .get(pb::AssetId {
                organization_id: organization_id.to_string(),
                asset_id: asset_id.to_string(),
            })
            .await?;
        Ok(response.into_inner())
    }

    async fn list(&self, organization_id: &str) -> Result<Vec<pb::Asset>, PlaneError> {
        let mut client = AssetsClient::new(self.channel.clone());
        let response = client
            .list(pb::OrganizationId {
                organization_id: organization_id.to_string(),
            })
            .await?;
        Ok(response.into_inner().assets)
    }

    async fn list_controller_assets(
        &self,
        organization_id: &str,
        edge_controller_id: &str,
    ) -> Result<Vec<pb::Asset>, PlaneError> {
        let mut client = AssetsClient::new(self.channel.clone());
        let response = client
            .list_controller_assets(pb::EdgeControllerId {
                organization_id: organization_id.to_string(),
                edge_controller_id: edge_controller_id.to_string(),
            })
            .await?;
        Ok(response.into_inner().assets)
    }
}

#[async_trait]
impl ControllerInventory for GrpcInventory {
    async fn list(&self, organization_id: &str) -> Result<Vec<pb::EdgeController>, PlaneError> {
        let mut client = ControllersClient::new(self.channel.clone());
        let response = client
            .list(pb::OrganizationId {
                organization_id: organization_id.to_string(),
            })
            .await?;
        Ok(response.into_inner().controllers)
    }
}
