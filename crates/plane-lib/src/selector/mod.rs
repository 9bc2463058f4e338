//! Selector resolution
//!
//! Turns an asset selector into the minimal set of per-edge-controller
//! sub-requests. Three strategies are tried in precedence order; whatever
//! they produce is then pruned of hidden and stale edge controllers.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::PlaneError;
use crate::inventory::{AssetInventory, ControllerInventory};
use crate::proto::monitoring::v1 as pb;
use crate::validator;

/// Edge controller id to the sub-selector that should be sent to exactly
/// that controller. Every key equals the `edge_controller_id` of its value.
pub type SelectorMap = HashMap<String, pb::AssetSelector>;

/// Controllers whose last liveness report is older than this are pruned.
pub const DEFAULT_ALIVE_TIMEOUT_SECONDS: i64 = 600;

/// Stateless factory resolving selectors against the inventory.
pub struct SelectorResolver {
    assets: Arc<dyn AssetInventory>,
    controllers: Arc<dyn ControllerInventory>,
    alive_timeout: Duration,
}

impl SelectorResolver {
    pub fn new(assets: Arc<dyn AssetInventory>, controllers: Arc<dyn ControllerInventory>) -> Self {
        Self::with_alive_timeout(assets, controllers, DEFAULT_ALIVE_TIMEOUT_SECONDS)
    }

    pub fn with_alive_timeout(
        assets: Arc<dyn AssetInventory>,
        controllers: Arc<dyn ControllerInventory>,
        alive_timeout_seconds: i64,
    ) -> Self {
        SelectorResolver {
            assets,
            controllers,
            alive_timeout: Duration::seconds(alive_timeout_seconds),
        }
    }

    /// Resolve a selector to its per-controller sub-selectors. An empty map
    /// is a valid outcome: there is nothing to query.
    pub async fn resolve(&self, selector: &pb::AssetSelector) -> Result<SelectorMap, PlaneError> {
        validator::validate_asset_selector(selector)?;
        let map = match self.from_explicit_assets(selector).await? {
            Some(map) => map,
            None => match self.from_unfiltered(selector).await? {
                Some(map) => map,
                None => self.from_filtered(selector).await?,
            },
        };
        self.filter_controllers(&selector.organization_id, map, Utc::now())
            .await
    }

    /// Strategy 1: the caller named explicit assets.
    async fn from_explicit_assets(
        &self,
        selector: &pb::AssetSelector,
    ) -> Result<Option<SelectorMap>, PlaneError> {
        if selector.asset_ids.is_empty() {
            return Ok(None);
        }

        let mut fetched = Vec::with_capacity(selector.asset_ids.len());
        for asset_id in &selector.asset_ids {
            let asset = self
                .assets
                .get(&selector.organization_id, asset_id)
                .await
                .map_err(|e| {
                    PlaneError::unavailable(format!("unable to retrieve asset {}: {}", asset_id, e))
                })?;
            fetched.push(asset);
        }

        Ok(Some(group_by_controller(
            &selector.organization_id,
            fetched
                .into_iter()
                .filter(|asset| selected_asset(asset, selector)),
        )))
    }

    /// Strategy 2: no label or group filters; controllers can be addressed
    /// directly.
    async fn from_unfiltered(
        &self,
        selector: &pb::AssetSelector,
    ) -> Result<Option<SelectorMap>, PlaneError> {
        if !selector.labels.is_empty() || !selector.group_ids.is_empty() {
            return Ok(None);
        }

        let mut map = SelectorMap::new();
        if !selector.edge_controller_id.is_empty() {
            map.insert(selector.edge_controller_id.clone(), selector.clone());
            return Ok(Some(map));
        }

        let controllers = self
            .controllers
            .list(&selector.organization_id)
            .await
            .map_err(|e| {
                PlaneError::unavailable(format!(
                    "unable to list edge controllers for {}: {}",
                    selector.organization_id, e
                ))
            })?;
        for controller in controllers {
            map.insert(
                controller.edge_controller_id.clone(),
                pb::AssetSelector {
                    organization_id: selector.organization_id.clone(),
                    edge_controller_id: controller.edge_controller_id,
                    ..Default::default()
                },
            );
        }
        Ok(Some(map))
    }

    /// Strategy 3: filter the controller's (or the organization's) assets.
    async fn from_filtered(&self, selector: &pb::AssetSelector) -> Result<SelectorMap, PlaneError> {
        let listed = if selector.edge_controller_id.is_empty() {
            self.assets.list(&selector.organization_id).await.map_err(|e| {
                PlaneError::unavailable(format!(
                    "unable to list assets for {}: {}",
                    selector.organization_id, e
                ))
            })?
        } else {
            self.assets
                .list_controller_assets(&selector.organization_id, &selector.edge_controller_id)
                .await
                .map_err(|e| {
                    PlaneError::unavailable(format!(
                        "unable to list assets for controller {}: {}",
                        selector.edge_controller_id, e
                    ))
                })?
        };

        Ok(group_by_controller(
            &selector.organization_id,
            listed.into_iter().filter(|asset| selected_asset(asset, selector)),
        ))
    }

    /// Drop controllers that are hidden or have not reported alive within
    /// the timeout. Wall clock is passed in so the cutoff is computed once.
    async fn filter_controllers(
        &self,
        organization_id: &str,
        mut map: SelectorMap,
        now: DateTime<Utc>,
    ) -> Result<SelectorMap, PlaneError> {
        if map.is_empty() {
            return Ok(map);
        }

        let controllers = self.controllers.list(organization_id).await.map_err(|e| {
            PlaneError::unavailable(format!(
                "unable to list edge controllers for {}: {}",
                organization_id, e
            ))
        })?;

        let cutoff = (now - self.alive_timeout).timestamp();
        let alive: HashMap<&str, bool> = controllers
            .iter()
            .map(|controller| {
                (
                    controller.edge_controller_id.as_str(),
                    controller.show && controller.last_alive_timestamp >= cutoff,
                )
            })
            .collect();

        map.retain(|edge_controller_id, _| {
            let keep = alive.get(edge_controller_id.as_str()).copied().unwrap_or(false);
            if !keep {
                debug!(edge_controller_id = %edge_controller_id, "pruning unavailable edge controller");
            }
            keep
        });
        Ok(map)
    }
}

/// Asset filter shared by the explicit and filtered strategies: same
/// organization, matching controller when the selector names one, and every
/// selector label present with an equal value on the asset.
fn selected_asset(asset: &pb::Asset, selector: &pb::AssetSelector) -> bool {
    if asset.organization_id != selector.organization_id {
        return false;
    }
    if !selector.edge_controller_id.is_empty()
        && asset.edge_controller_id != selector.edge_controller_id
    {
        return false;
    }
    selector
        .labels
        .iter()
        .all(|(key, value)| asset.labels.get(key) == Some(value))
}

fn group_by_controller(
    organization_id: &str,
    assets: impl Iterator<Item = pb::Asset>,
) -> SelectorMap {
    let mut map = SelectorMap::new();
    for asset in assets {
        if asset.edge_controller_id.is_empty() {
            debug!(asset_id = %asset.asset_id, "asset without edge controller, skipping");
            continue;
        }
        let entry = map
            .entry(asset.edge_controller_id.clone())
            .or_insert_with(|| pb::AssetSelector {
                organization_id: organization_id.to_string(),
                edge_controller_id: asset.edge_controller_id.clone(),
                ..Default::default()
            });
        entry.asset_ids.push(asset.asset_id);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::async_trait;
    use std::collections::HashMap as StdHashMap;

    struct MockInventory {
        assets: Vec<pb::Asset>,
        controllers: Vec<pb::EdgeController>,
        fail: bool,
    }

    impl MockInventory {
        fn new(assets: Vec<pb::Asset>, controllers: Vec<pb::EdgeController>) -> Arc<Self> {
            Arc::new(MockInventory {
                assets,
                controllers,
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(MockInventory {
                assets: Vec::new(),
                controllers: Vec::new(),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl AssetInventory for MockInventory {
        async fn get(&self, _org: &str, asset_id: &str) -> Result<pb::Asset, PlaneError> {
            if self.fail {
                return Err(PlaneError::unavailable("inventory down"));
            }
            self.assets
                .iter()
                .find(|asset| asset.asset_id == asset_id)
                .cloned()
                .ok_or_else(|| PlaneError::not_found(asset_id.to_string()))
        }

        async fn list(&self, org: &str) -> Result<Vec<pb::Asset>, PlaneError> {
            if self.fail {
                return Err(PlaneError::unavailable("inventory down"));
            }
            Ok(self
                .assets
                .iter()
                .filter(|asset| asset.organization_id == org)
                .cloned()
                .collect())
        }

        async fn list_controller_assets(
            &self,
            org: &str,
            edge_controller_id: &str,
        ) -> Result<Vec<pb::Asset>, PlaneError> {
            Ok(AssetInventory::list(self, org)
                .await?
                .into_iter()
                .filter(|asset| asset.edge_controller_id == edge_controller_id)
                .collect())
        }
    }

    #[async_trait]
    impl ControllerInventory for MockInventory {
        async fn list(&self, _org: &str) -> Result<Vec<pb::EdgeController>, PlaneError> {
            if self.fail {
                return Err(PlaneError::unavailable("inventory down"));
            }
            Ok(self.controllers.clone())
        }
    }

    fn asset(id: &str, ec: &str, labels: &[(&str, &str)]) -> pb::Asset {
        pb::Asset {
            organization_id: "org-1".to_string(),
            asset_id: id.to_string(),
            edge_controller_id: ec.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<StdHashMap<_, _>>(),
            group_ids: Vec::new(),
        }
    }

    fn controller(id: &str, show: bool, alive_secs_ago: i64) -> pb::EdgeController {
        pb::EdgeController {
            organization_id: "org-1".to_string(),
            edge_controller_id: id.to_string(),
            show,
            last_alive_timestamp: (Utc::now() - Duration::seconds(alive_secs_ago)).timestamp(),
        }
    }

    fn selector(org: &str) -> pb::AssetSelector {
        pb::AssetSelector {
            organization_id: org.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn explicit_assets_group_by_controller() {
        let inventory = MockInventory::new(
            vec![
                asset("a1", "ec1", &[]),
                asset("a2", "ec1", &[]),
                asset("a3", "ec2", &[]),
            ],
            vec![controller("ec1", true, 10), controller("ec2", true, 10)],
        );
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let mut sel = selector("org-1");
        sel.asset_ids = vec!["a1".to_string(), "a2".to_string(), "a3".to_string()];
        let map = resolver.resolve(&sel).await.unwrap();

        assert_eq!(map.len(), 2);
        let mut ec1_assets = map["ec1"].asset_ids.clone();
        ec1_assets.sort();
        assert_eq!(ec1_assets, vec!["a1", "a2"]);
        assert_eq!(map["ec2"].asset_ids, vec!["a3"]);
        // Map key equals the sub-selector's controller id.
        for (key, value) in &map {
            assert_eq!(key, &value.edge_controller_id);
        }
    }

    #[tokio::test]
    async fn explicit_assets_respect_label_filter() {
        let inventory = MockInventory::new(
            vec![
                asset("a1", "ec1", &[("tier", "edge")]),
                asset("a2", "ec1", &[("tier", "core")]),
            ],
            vec![controller("ec1", true, 10)],
        );
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let mut sel = selector("org-1");
        sel.asset_ids = vec!["a1".to_string(), "a2".to_string()];
        sel.labels.insert("tier".to_string(), "edge".to_string());
        let map = resolver.resolve(&sel).await.unwrap();

        assert_eq!(map["ec1"].asset_ids, vec!["a1"]);
    }

    #[tokio::test]
    async fn unfiltered_with_controller_returns_original_selector() {
        let inventory = MockInventory::new(Vec::new(), vec![controller("ec1", true, 10)]);
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let mut sel = selector("org-1");
        sel.edge_controller_id = "ec1".to_string();
        let map = resolver.resolve(&sel).await.unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map["ec1"], sel);
    }

    #[tokio::test]
    async fn unfiltered_without_controller_enumerates_organization() {
        let inventory = MockInventory::new(
            Vec::new(),
            vec![controller("ec1", true, 10), controller("ec2", true, 20)],
        );
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let map = resolver.resolve(&selector("org-1")).await.unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["ec1"].organization_id, "org-1");
        assert_eq!(map["ec1"].edge_controller_id, "ec1");
        assert!(map["ec1"].asset_ids.is_empty());
    }

    #[tokio::test]
    async fn label_filter_lists_and_groups() {
        let inventory = MockInventory::new(
            vec![
                asset("a1", "ec1", &[("site", "berlin")]),
                asset("a2", "ec2", &[("site", "berlin")]),
                asset("a3", "ec2", &[("site", "paris")]),
            ],
            vec![controller("ec1", true, 10), controller("ec2", true, 10)],
        );
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let mut sel = selector("org-1");
        sel.labels.insert("site".to_string(), "berlin".to_string());
        let map = resolver.resolve(&sel).await.unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["ec1"].asset_ids, vec!["a1"]);
        assert_eq!(map["ec2"].asset_ids, vec!["a2"]);
    }

    #[tokio::test]
    async fn stale_and_hidden_controllers_are_pruned() {
        let inventory = MockInventory::new(
            Vec::new(),
            vec![
                controller("ec1", true, 100),
                controller("ec2", true, 900),
                controller("ec3", false, 10),
            ],
        );
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let map = resolver.resolve(&selector("org-1")).await.unwrap();

        assert_eq!(map.len(), 1);
        assert!(map.contains_key("ec1"));
    }

    #[tokio::test]
    async fn selector_without_organization_is_rejected() {
        let inventory = MockInventory::new(Vec::new(), Vec::new());
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let err = resolver.resolve(&selector("")).await.unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn empty_result_is_valid() {
        let inventory = MockInventory::new(Vec::new(), Vec::new());
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let map = resolver.resolve(&selector("org-1")).await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn inventory_error_is_unavailable_with_id() {
        let inventory = MockInventory::failing();
        let resolver = SelectorResolver::new(inventory.clone(), inventory);

        let mut sel = selector("org-1");
        sel.asset_ids = vec!["a9".to_string()];
        let err = resolver.resolve(&sel).await.unwrap_err();
        match err {
            PlaneError::Unavailable(message) => assert!(message.contains("a9")),
            other => panic!("expected unavailable, got {:?}", other),
        }
    }
}
