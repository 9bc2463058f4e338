//! Generated protobuf code
//!
//! This module contains the generated Rust code from protobuf definitions.
//! The code is generated at build time by tonic-build.
//!
//! If protoc is not available, stub types are provided for development.

#[cfg(feature = "proto-gen")]
pub mod monitoring {
    pub mod v1 {
        tonic::include_proto!("monitoring.v1");
    }
}

// Provide stub types when proto generation is not available
#[cfg(not(feature = "proto-gen"))]
pub mod monitoring {
    pub mod v1 {
        use prost::Message;
        use std::collections::HashMap;

        // ---- Inventory ----

        #[derive(Clone, PartialEq, Message)]
        pub struct OrganizationId {
            #[prost(string, tag = "1")]
            pub organization_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ClusterId {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct Cluster {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
            #[prost(string, tag = "3")]
            pub hostname: String,
            #[prost(double, tag = "4")]
            pub millicores_conversion_factor: f64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ClusterList {
            #[prost(message, repeated, tag = "1")]
            pub clusters: Vec<Cluster>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct AssetId {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub asset_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct Asset {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub asset_id: String,
            #[prost(string, tag = "3")]
            pub edge_controller_id: String,
            #[prost(map = "string, string", tag = "4")]
            pub labels: HashMap<String, String>,
            #[prost(string, repeated, tag = "5")]
            pub group_ids: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct AssetList {
            #[prost(message, repeated, tag = "1")]
            pub assets: Vec<Asset>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct EdgeControllerId {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub edge_controller_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct EdgeController {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub edge_controller_id: String,
            #[prost(bool, tag = "3")]
            pub show: bool,
            /// Seconds since epoch of the last liveness report.
            #[prost(int64, tag = "4")]
            pub last_alive_timestamp: i64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct EdgeControllerList {
            #[prost(message, repeated, tag = "1")]
            pub controllers: Vec<EdgeController>,
        }

        // ---- Cluster query plane ----

        #[derive(Clone, PartialEq, Message)]
        pub struct ClusterSummaryRequest {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
            /// Averaging window in minutes; 0 asks for instantaneous values.
            #[prost(int32, tag = "3")]
            pub range_minutes: i32,
        }

        #[derive(Clone, Copy, PartialEq, Message)]
        pub struct ResourceAmount {
            #[prost(int64, tag = "1")]
            pub total: i64,
            #[prost(int64, tag = "2")]
            pub available: i64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ClusterSummary {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
            #[prost(message, optional, tag = "3")]
            pub cpu_millicores: Option<ResourceAmount>,
            #[prost(message, optional, tag = "4")]
            pub memory_bytes: Option<ResourceAmount>,
            #[prost(message, optional, tag = "5")]
            pub storage_bytes: Option<ResourceAmount>,
            #[prost(message, optional, tag = "6")]
            pub usable_storage_bytes: Option<ResourceAmount>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ClusterStatsRequest {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
            #[prost(int32, tag = "3")]
            pub range_minutes: i32,
            /// PlatformStatsField values; empty means all fields.
            #[prost(int32, repeated, tag = "4")]
            pub fields: Vec<i32>,
        }

        #[derive(Clone, Copy, PartialEq, Message)]
        pub struct StatCounters {
            #[prost(int64, tag = "1")]
            pub created: i64,
            #[prost(int64, tag = "2")]
            pub deleted: i64,
            #[prost(int64, tag = "3")]
            pub errors: i64,
            #[prost(int64, tag = "4")]
            pub running: i64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ClusterStats {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
            /// Keyed by PlatformStatsField.
            #[prost(map = "int32, message", tag = "3")]
            pub stats: HashMap<i32, StatCounters>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct QueryRange {
            #[prost(message, optional, tag = "1")]
            pub start: Option<prost_types::Timestamp>,
            #[prost(message, optional, tag = "2")]
            pub end: Option<prost_types::Timestamp>,
            /// Step in seconds.
            #[prost(float, tag = "3")]
            pub step: f32,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct QueryRequest {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
            /// Provider type identifier, e.g. "PROMETHEUS".
            #[prost(string, tag = "3")]
            pub r#type: String,
            #[prost(string, tag = "4")]
            pub query: String,
            #[prost(message, optional, tag = "5")]
            pub range: Option<QueryRange>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct QuerySample {
            /// Seconds since epoch.
            #[prost(int64, tag = "1")]
            pub timestamp: i64,
            #[prost(string, tag = "2")]
            pub value: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct QuerySeries {
            #[prost(map = "string, string", tag = "1")]
            pub labels: HashMap<String, String>,
            #[prost(message, repeated, tag = "2")]
            pub samples: Vec<QuerySample>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct QueryResult {
            /// Result shape: scalar, vector, matrix or string.
            #[prost(string, tag = "1")]
            pub result_type: String,
            #[prost(message, repeated, tag = "2")]
            pub series: Vec<QuerySeries>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct QueryResponse {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
            #[prost(string, tag = "3")]
            pub r#type: String,
            #[prost(message, optional, tag = "4")]
            pub result: Option<QueryResult>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ContainerStatsRequest {}

        #[derive(Clone, PartialEq, Message)]
        pub struct ContainerStats {
            #[prost(string, tag = "1")]
            pub namespace: String,
            #[prost(string, tag = "2")]
            pub pod: String,
            #[prost(string, tag = "3")]
            pub container: String,
            #[prost(double, tag = "4")]
            pub cpu_millicore: f64,
            #[prost(double, tag = "5")]
            pub memory_byte: f64,
            #[prost(double, tag = "6")]
            pub storage_byte: f64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ContainerStatsResponse {
            #[prost(message, repeated, tag = "1")]
            pub container_stats: Vec<ContainerStats>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct OrganizationApplicationStatsRequest {
            #[prost(string, tag = "1")]
            pub organization_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ServiceInstanceStats {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub organization_name: String,
            #[prost(string, tag = "3")]
            pub app_instance_id: String,
            #[prost(string, tag = "4")]
            pub app_instance_name: String,
            #[prost(string, tag = "5")]
            pub service_group_instance_id: String,
            #[prost(string, tag = "6")]
            pub service_instance_id: String,
            #[prost(string, tag = "7")]
            pub service_instance_name: String,
            #[prost(double, tag = "8")]
            pub cpu_millicore: f64,
            #[prost(double, tag = "9")]
            pub memory_byte: f64,
            #[prost(double, tag = "10")]
            pub storage_byte: f64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct OrganizationApplicationStatsResponse {
            #[prost(message, repeated, tag = "1")]
            pub service_instance_stats: Vec<ServiceInstanceStats>,
            /// Seconds since epoch at which the view was assembled.
            #[prost(int64, tag = "2")]
            pub timestamp: i64,
        }

        // ---- Asset query plane ----

        #[derive(Clone, PartialEq, Message)]
        pub struct AssetSelector {
            #[prost(string, tag = "1")]
            pub organization_id: String,
            #[prost(string, tag = "2")]
            pub edge_controller_id: String,
            #[prost(string, repeated, tag = "3")]
            pub asset_ids: Vec<String>,
            #[prost(string, repeated, tag = "4")]
            pub group_ids: Vec<String>,
            #[prost(map = "string, string", tag = "5")]
            pub labels: HashMap<String, String>,
        }

        #[derive(Clone, Copy, PartialEq, Message)]
        pub struct TimeRange {
            /// Point query when non-zero; the bounded fields must then be zero.
            #[prost(int64, tag = "1")]
            pub timestamp: i64,
            #[prost(int64, tag = "2")]
            pub time_start: i64,
            #[prost(int64, tag = "3")]
            pub time_end: i64,
            #[prost(int64, tag = "4")]
            pub resolution: i64,
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[repr(i32)]
        pub enum AggregationType {
            #[default]
            None = 0,
            Sum = 1,
            Avg = 2,
        }

        impl AggregationType {
            pub fn as_str_name(&self) -> &'static str {
                match self {
                    AggregationType::None => "AGGREGATION_TYPE_NONE",
                    AggregationType::Sum => "AGGREGATION_TYPE_SUM",
                    AggregationType::Avg => "AGGREGATION_TYPE_AVG",
                }
            }

            pub fn from_i32(value: i32) -> Option<Self> {
                match value {
                    0 => Some(AggregationType::None),
                    1 => Some(AggregationType::Sum),
                    2 => Some(AggregationType::Avg),
                    _ => None,
                }
            }
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct QueryMetricsRequest {
            #[prost(message, optional, tag = "1")]
            pub assets: Option<AssetSelector>,
            #[prost(string, repeated, tag = "2")]
            pub metrics: Vec<String>,
            #[prost(message, optional, tag = "3")]
            pub time_range: Option<TimeRange>,
            /// AggregationType value.
            #[prost(int32, tag = "4")]
            pub aggregation: i32,
        }

        #[derive(Clone, Copy, PartialEq, Message)]
        pub struct MetricValue {
            #[prost(int64, tag = "1")]
            pub timestamp: i64,
            #[prost(int64, tag = "2")]
            pub value: i64,
            /// Number of assets contributing to the value; preserved across
            /// merges so AVG can be computed from a SUM afterwards.
            #[prost(int64, tag = "3")]
            pub asset_count: i64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct AssetMetricValues {
            #[prost(string, tag = "1")]
            pub asset_id: String,
            #[prost(message, repeated, tag = "2")]
            pub values: Vec<MetricValue>,
            /// AggregationType value applied to these samples.
            #[prost(int32, tag = "3")]
            pub aggregation: i32,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct AssetMetrics {
            #[prost(message, repeated, tag = "1")]
            pub metrics: Vec<AssetMetricValues>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct QueryMetricsResult {
            #[prost(map = "string, message", tag = "1")]
            pub metrics: HashMap<String, AssetMetrics>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct MetricsList {
            #[prost(string, repeated, tag = "1")]
            pub metrics: Vec<String>,
        }

        pub mod clusters_client {
            use super::*;
            use tonic::codegen::*;

            /// Inventory client for cluster records.
            #[derive(Debug, Clone)]
            pub struct ClustersClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl ClustersClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> ClustersClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub async fn get_cluster(
                    &mut self,
                    request: impl tonic::IntoRequest<ClusterId>,
                ) -> Result<tonic::Response<Cluster>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.Clusters/GetCluster",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn list_clusters(
                    &mut self,
                    request: impl tonic::IntoRequest<OrganizationId>,
                ) -> Result<tonic::Response<ClusterList>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.Clusters/ListClusters",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }
            }
        }

        pub mod assets_client {
            use super::*;
            use tonic::codegen::*;

            /// Inventory client for asset records.
            #[derive(Debug, Clone)]
            pub struct AssetsClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl AssetsClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> AssetsClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub async fn get(
                    &mut self,
                    request: impl tonic::IntoRequest<AssetId>,
                ) -> Result<tonic::Response<Asset>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path =
                        http::uri::PathAndQuery::from_static("/monitoring.v1.Assets/Get");
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn list(
                    &mut self,
                    request: impl tonic::IntoRequest<OrganizationId>,
                ) -> Result<tonic::Response<AssetList>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path =
                        http::uri::PathAndQuery::from_static("/monitoring.v1.Assets/List");
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn list_controller_assets(
                    &mut self,
                    request: impl tonic::IntoRequest<EdgeControllerId>,
                ) -> Result<tonic::Response<AssetList>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.Assets/ListControllerAssets",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }
            }
        }

        pub mod controllers_client {
            use super::*;
            use tonic::codegen::*;

            /// Inventory client for edge controller records.
            #[derive(Debug, Clone)]
            pub struct ControllersClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl ControllersClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> ControllersClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub async fn list(
                    &mut self,
                    request: impl tonic::IntoRequest<OrganizationId>,
                ) -> Result<tonic::Response<EdgeControllerList>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.Controllers/List",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }
            }
        }

        pub mod edge_monitoring_proxy_client {
            use super::*;
            use tonic::codegen::*;

            /// Client for the proxy fronting edge controllers.
            #[derive(Debug, Clone)]
            pub struct EdgeMonitoringProxyClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl EdgeMonitoringProxyClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> EdgeMonitoringProxyClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub async fn list_metrics(
                    &mut self,
                    request: impl tonic::IntoRequest<AssetSelector>,
                ) -> Result<tonic::Response<MetricsList>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.EdgeMonitoringProxy/ListMetrics",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn query_metrics(
                    &mut self,
                    request: impl tonic::IntoRequest<QueryMetricsRequest>,
                ) -> Result<tonic::Response<QueryMetricsResult>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.EdgeMonitoringProxy/QueryMetrics",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }
            }
        }

        pub mod metrics_collector_client {
            use super::*;
            use tonic::codegen::*;

            /// Client for the in-cluster metrics collector.
            #[derive(Debug, Clone)]
            pub struct MetricsCollectorClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl MetricsCollectorClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> MetricsCollectorClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub async fn get_cluster_summary(
                    &mut self,
                    request: impl tonic::IntoRequest<ClusterSummaryRequest>,
                ) -> Result<tonic::Response<ClusterSummary>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.MetricsCollector/GetClusterSummary",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn get_cluster_stats(
                    &mut self,
                    request: impl tonic::IntoRequest<ClusterStatsRequest>,
                ) -> Result<tonic::Response<ClusterStats>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.MetricsCollector/GetClusterStats",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn query(
                    &mut self,
                    request: impl tonic::IntoRequest<QueryRequest>,
                ) -> Result<tonic::Response<QueryResponse>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.MetricsCollector/Query",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn get_container_stats(
                    &mut self,
                    request: impl tonic::IntoRequest<ContainerStatsRequest>,
                ) -> Result<tonic::Response<ContainerStatsResponse>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.MetricsCollector/GetContainerStats",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }
            }
        }
    }
}

pub use monitoring::v1::assets_client::AssetsClient;
pub use monitoring::v1::clusters_client::ClustersClient;
pub use monitoring::v1::controllers_client::ControllersClient;
pub use monitoring::v1::edge_monitoring_proxy_client::EdgeMonitoringProxyClient;
pub use monitoring::v1::metrics_collector_client::MetricsCollectorClient;
