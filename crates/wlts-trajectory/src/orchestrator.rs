//! Trajectory orchestration
//!
//! A request goes through four phases: names are validated and resolved
//! against the registry before any datasource is touched, collections are
//! queried concurrently, and their points are merged into one list sorted by
//! date before being wrapped with the echoed query.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use wlts_core::error::{Result, WltsError};
use wlts_core::models::{
    CollectionDescription, Roles, TrajectoryPoint, TrajectoryQuery, TrajectoryResponse,
    TrajectoryResult,
};

use crate::collection::Collection;
use crate::registry::CollectionRegistry;

/// Entry point of the trajectory engine
#[derive(Debug)]
pub struct TrajectoryService {
    collections: CollectionRegistry,
    max_concurrency: usize,
}

impl TrajectoryService {
    /// `max_concurrency` bounds the collections queried at once
    pub fn new(collections: CollectionRegistry, max_concurrency: usize) -> Self {
        Self { collections, max_concurrency: max_concurrency.max(1) }
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.collections
    }

    /// Names of the collections visible to the caller, in catalog order
    pub fn list_collections(&self, roles: &Roles) -> Vec<String> {
        self.collections
            .iter()
            .filter(|c| roles.can_see(c.name(), c.is_public()))
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn describe_collection(&self, name: &str, roles: &Roles) -> Result<CollectionDescription> {
        Ok(self.visible(name, roles)?.describe())
    }

    /// A collection by name, failing with `NotFound` or `Forbidden`
    pub fn visible(&self, name: &str, roles: &Roles) -> Result<&Arc<Collection>> {
        let collection = self
            .collections
            .get(name)
            .ok_or_else(|| WltsError::CollectionNotFound { name: name.to_string() })?;
        if !roles.can_see(collection.name(), collection.is_public()) {
            return Err(WltsError::Forbidden { name: name.to_string() });
        }
        Ok(collection)
    }

    fn resolve(&self, query: &TrajectoryQuery, roles: &Roles) -> Result<Vec<&Arc<Collection>>> {
        match &query.collections {
            Some(names) => names.iter().map(|name| self.visible(name, roles)).collect(),
            None => Ok(self
                .collections
                .iter()
                .filter(|c| roles.can_see(c.name(), c.is_public()))
                .collect()),
        }
    }

    pub async fn get_trajectory(
        &self,
        query: &TrajectoryQuery,
        roles: &Roles,
    ) -> Result<TrajectoryResponse> {
        // Phase 1: Validate and resolve collection names
        query.validate()?;
        let collections = self.resolve(query, roles)?;

        tracing::debug!(
            collections = collections.len(),
            longitude = query.longitude,
            latitude = query.latitude,
            "Resolving trajectory"
        );

        // Phase 2: Fan out; the first hard failure cancels the remaining collections
        let parts: Vec<Vec<TrajectoryPoint>> = stream::iter(collections.into_iter().cloned())
            .map(|collection| async move {
                let points = collection.trajectory(query).await.inspect_err(|e| {
                    tracing::warn!(collection = %collection.name(), error = %e, "Collection failed");
                })?;
                tracing::debug!(collection = %collection.name(), points = points.len(), "Collection done");
                Ok::<_, WltsError>(points)
            })
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;

        // Phase 3: Merge and sort
        let trajectory = merge_sorted(parts);

        // Phase 4: Respond
        Ok(TrajectoryResponse { query: query.echo(), result: TrajectoryResult { trajectory } })
    }
}

/// Concatenate per-collection points and sort them by date.
///
/// The sort is stable: points with equal dates keep their emission order.
pub fn merge_sorted(parts: Vec<Vec<TrajectoryPoint>>) -> Vec<TrajectoryPoint> {
    let mut trajectory: Vec<TrajectoryPoint> = parts.into_iter().flatten().collect();
    trajectory.sort_by(|a, b| a.date.cmp(&b.date));
    trajectory
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(collection: &str, date: &str) -> TrajectoryPoint {
        TrajectoryPoint {
            collection: collection.to_string(),
            class: "x".to_string(),
            date: date.to_string(),
            geometry: None,
        }
    }

    #[test]
    fn test_merge_is_stable() {
        let merged = merge_sorted(vec![
            vec![point("a", "2019"), point("a", "2017")],
            vec![point("b", "2017"), point("b", "2018")],
        ]);
        let order: Vec<(&str, &str)> =
            merged.iter().map(|p| (p.collection.as_str(), p.date.as_str())).collect();
        assert_eq!(order, vec![("a", "2017"), ("b", "2017"), ("b", "2018"), ("a", "2019")]);
    }

    proptest! {
        #[test]
        fn prop_merged_dates_ascend(
            parts in prop::collection::vec(
                prop::collection::vec((1985i32..2021, 1u32..13), 0..8),
                0..5,
            )
        ) {
            let parts: Vec<Vec<TrajectoryPoint>> = parts
                .into_iter()
                .enumerate()
                .map(|(i, dates)| {
                    dates
                        .into_iter()
                        .map(|(y, m)| point(&format!("c{}", i), &format!("{:04}-{:02}", y, m)))
                        .collect()
                })
                .collect();
            let total: usize = parts.iter().map(Vec::len).sum();

            let merged = merge_sorted(parts);
            prop_assert_eq!(merged.len(), total);
            for pair in merged.windows(2) {
                prop_assert!(pair[0].date <= pair[1].date);
            }
        }
    }
}
