//! Enumerates sealed secrets across the cluster.

use crate::in_stage;
use reseal_services::kubectl::SEALED_SECRET_KIND;
use reseal_services::KubectlClient;
use reseal_types::{ResealError, Result, SealedSecretRef};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ResourceList {
    items: Vec<ResourceItem>,
}

#[derive(Debug, Deserialize)]
struct ResourceItem {
    #[serde(default)]
    metadata: ObjectMeta,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
}

/// Lists every sealed secret in every namespace.
#[derive(Clone)]
pub struct InventoryLister {
    kubectl: KubectlClient,
}

impl InventoryLister {
    /// Create a lister using `kubectl`.
    pub fn new(kubectl: KubectlClient) -> Self {
        Self { kubectl }
    }

    /// Query the cluster for the full inventory.
    ///
    /// Either the whole list is returned, in cluster order, or an
    /// `Inventory` error; a partial inventory is never produced.
    pub async fn list_sealed_secrets(&self) -> Result<Vec<SealedSecretRef>> {
        let json = self
            .kubectl
            .list_all(SEALED_SECRET_KIND)
            .await
            .map_err(in_stage(ResealError::Inventory))?;

        let refs = parse_inventory(&json)?;
        info!("Found {} sealed secrets", refs.len());
        Ok(refs)
    }
}

/// Parse a `kubectl get -o json` list into sealed secret references.
pub fn parse_inventory(json: &str) -> Result<Vec<SealedSecretRef>> {
    let list: ResourceList = serde_json::from_str(json)
        .map_err(|e| ResealError::Inventory(format!("Malformed sealed secret list: {}", e)))?;

    list.items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let meta = item.metadata;
            let name = meta.name.ok_or_else(|| {
                ResealError::Inventory(format!("Item {} in sealed secret list has no name", index))
            })?;
            let namespace = meta.namespace.ok_or_else(|| {
                ResealError::Inventory(format!("Sealed secret '{}' has no namespace", name))
            })?;

            debug!("Inventoried {}/{}", namespace, name);
            SealedSecretRef::new(name, namespace).map_err(in_stage(ResealError::Inventory))
        })
        .collect()
}
