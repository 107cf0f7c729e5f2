//! Datasource and collection registries
//!
//! Both registries are built once at startup from a validated catalog and
//! are read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use wlts_core::catalog::{Catalog, CollectionCommon};
use wlts_core::error::{Result, WltsError};
use wlts_core::models::{CollectionKind, CollectionMeta};
use wlts_datasource::{ClassLookup, Datasource};

use crate::classification::ClassResolver;
use crate::collection::{Collection, FeatureCollection, ImageCollection};

/// Datasources keyed by id
#[derive(Debug, Clone, Default)]
pub struct DatasourceRegistry {
    datasources: HashMap<String, Datasource>,
}

impl DatasourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a protocol client for every datasource in the catalog
    pub fn from_catalog(catalog: &Catalog, timeout: Duration) -> Result<Self> {
        let mut registry = Self::new();
        for definition in &catalog.datasources {
            registry.insert(Datasource::from_definition(definition, timeout)?);
        }
        Ok(registry)
    }

    /// Register a datasource, replacing any previous one with the same id
    pub fn insert(&mut self, datasource: Datasource) {
        self.datasources.insert(datasource.id().to_string(), datasource);
    }

    pub fn with(mut self, datasource: Datasource) -> Self {
        self.insert(datasource);
        self
    }

    pub fn get(&self, id: &str) -> Result<&Datasource> {
        self.datasources
            .get(id)
            .ok_or_else(|| WltsError::DatasourceNotFound { id: id.to_string() })
    }

    pub fn len(&self) -> usize {
        self.datasources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasources.is_empty()
    }
}

/// Collections in catalog order, addressable by name
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: Vec<Arc<Collection>>,
    index: HashMap<String, usize>,
}

impl CollectionRegistry {
    /// Build every catalog collection against already created datasources.
    ///
    /// `raster_buffer` is the clip margin, in degrees, used by image
    /// collections around the query point.
    pub fn from_catalog(
        catalog: &Catalog,
        datasources: &DatasourceRegistry,
        raster_buffer: f64,
    ) -> Result<Self> {
        let mut registry = Self::default();

        for definition in &catalog.feature_collections {
            let (meta, resolver) = prepare(&definition.common, CollectionKind::Feature, datasources)?;
            let datasource = datasources.get(&definition.common.datasource_id)?;
            let adapter = datasource
                .as_vector()
                .cloned()
                .ok_or_else(|| kind_mismatch(&meta, datasource))?;
            registry.insert(Collection::Feature(FeatureCollection::new(
                meta, definition, adapter, resolver,
            )?))?;
        }

        for definition in &catalog.image_collections {
            let (meta, resolver) = prepare(&definition.common, CollectionKind::Image, datasources)?;
            let datasource = datasources.get(&definition.common.datasource_id)?;
            let adapter = datasource
                .as_raster()
                .cloned()
                .ok_or_else(|| kind_mismatch(&meta, datasource))?;
            registry.insert(Collection::Image(ImageCollection::new(
                meta,
                definition,
                adapter,
                resolver,
                raster_buffer,
            )?))?;
        }

        tracing::info!(collections = registry.len(), "Collection registry ready");
        Ok(registry)
    }

    fn insert(&mut self, collection: Collection) -> Result<()> {
        let name = collection.name().to_string();
        if self.index.contains_key(&name) {
            return Err(WltsError::config_invalid(
                "collections",
                format!("duplicate collection name '{}'", name),
            ));
        }
        self.index.insert(name, self.collections.len());
        self.collections.push(Arc::new(collection));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Collection>> {
        self.index.get(name).map(|&i| &self.collections[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Collection>> {
        self.collections.iter()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Metadata plus classification resolver of one catalog collection
fn prepare(
    common: &CollectionCommon,
    kind: CollectionKind,
    datasources: &DatasourceRegistry,
) -> Result<(CollectionMeta, ClassResolver)> {
    let meta = common.to_meta(kind)?;

    let lookup: Option<Arc<dyn ClassLookup>> = match meta.classification.datasource_id() {
        Some(id) => {
            let datasource = datasources.get(id)?;
            Some(datasource.as_class_lookup().ok_or_else(|| {
                WltsError::config_invalid(
                    format!("{}.classification.datasource_id", meta.name),
                    format!("datasource '{}' is {}, expected WFS", id, datasource.kind()),
                )
            })?)
        }
        None => None,
    };

    let resolver = ClassResolver::new(&meta.name, meta.classification.clone(), lookup)?;
    Ok((meta, resolver))
}

fn kind_mismatch(meta: &CollectionMeta, datasource: &Datasource) -> WltsError {
    WltsError::config_invalid(
        format!("{}.datasource_id", meta.name),
        format!("{} collection cannot use {} datasource '{}'", meta.kind, datasource.kind(), datasource.id()),
    )
}
