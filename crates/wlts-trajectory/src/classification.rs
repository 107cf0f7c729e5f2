//! Classification resolver
//!
//! Turns the raw value observed for one record or raster sample into the
//! class label reported in a trajectory point. A missing label is signalled
//! as [`WltsError::ClassNotFound`], which collections treat as "skip this
//! observation" rather than as a request failure.

use std::sync::Arc;

use wlts_core::error::{Result, WltsError};
use wlts_core::models::{ClassificationStrategy, ExternalClassification};
use wlts_datasource::{qualified_name, ClassLookup, ClassLookupRequest};

/// Resolves class labels for one collection
#[derive(Clone)]
pub struct ClassResolver {
    strategy: ClassificationStrategy,
    lookup: Option<Arc<dyn ClassLookup>>,
}

impl std::fmt::Debug for ClassResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassResolver")
            .field("strategy", &self.strategy.type_tag())
            .field("lookup", &self.lookup.as_ref().map(|l| l.datasource_id().to_string()))
            .finish()
    }
}

impl ClassResolver {
    /// An `External` strategy needs a lookup; the other modes ignore it
    pub fn new(
        collection: &str,
        strategy: ClassificationStrategy,
        lookup: Option<Arc<dyn ClassLookup>>,
    ) -> Result<Self> {
        if let ClassificationStrategy::External(external) = &strategy {
            if lookup.is_none() {
                return Err(WltsError::config_invalid(
                    format!("{}.classification.datasource_id", collection),
                    format!("datasource '{}' cannot answer class lookups", external.datasource_id),
                ));
            }
        }
        Ok(Self { strategy, lookup })
    }

    /// Label for one observation.
    ///
    /// `literal` is the label fixed by the observation descriptor and `raw`
    /// the value read from the record or sampled from the raster.
    pub async fn resolve(&self, literal: Option<&str>, raw: Option<&str>) -> Result<String> {
        match &self.strategy {
            ClassificationStrategy::Literal { .. } => literal
                .map(str::to_string)
                .ok_or_else(|| class_not_found("<literal>", "descriptor")),
            ClassificationStrategy::SelfValue { .. } => {
                raw.map(str::to_string).ok_or_else(|| class_not_found("<missing>", "record"))
            }
            ClassificationStrategy::External(external) => {
                let identifier = raw.ok_or_else(|| class_not_found("<missing>", "record"))?;
                self.lookup_external(external, identifier).await
            }
        }
    }

    async fn lookup_external(
        &self,
        external: &ExternalClassification,
        identifier: &str,
    ) -> Result<String> {
        let Some(lookup) = &self.lookup else {
            return Err(class_not_found(identifier, &external.property_name));
        };

        let workspace = external.workspace.as_deref().unwrap_or_else(|| lookup.workspace());
        let request = ClassLookupRequest::new(
            qualified_name(workspace, &external.property_name),
            &external.class_property_name,
            &external.class_property_value,
            identifier,
            external.system.name.clone(),
        )?;

        match lookup.lookup_class(&request).await {
            Ok(Some(label)) => Ok(label),
            Ok(None) => Err(class_not_found(identifier, &request.type_name)),
            Err(e) => {
                tracing::warn!(
                    datasource = %lookup.datasource_id(),
                    type_name = %request.type_name,
                    identifier = %identifier,
                    error = %e,
                    "Class lookup failed"
                );
                Err(class_not_found(identifier, &request.type_name))
            }
        }
    }
}

fn class_not_found(identifier: &str, type_name: &str) -> WltsError {
    WltsError::ClassNotFound { identifier: identifier.to_string(), type_name: type_name.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlts_core::models::ClassificationSystem;
    use wlts_core::ErrorKind;
    use wlts_datasource::{Datasource, MemoryVectorSource, RecordedRequest};

    fn external(system: Option<&str>) -> ClassificationStrategy {
        ClassificationStrategy::External(ExternalClassification {
            datasource_id: "lccs".to_string(),
            property_name: "mapbiomas_classes".to_string(),
            class_property_name: "description".to_string(),
            class_property_value: "class_id".to_string(),
            workspace: None,
            system: ClassificationSystem { name: system.map(str::to_string), ..Default::default() },
        })
    }

    fn lookup_source() -> (Arc<MemoryVectorSource>, Arc<dyn ClassLookup>) {
        let source = Arc::new(MemoryVectorSource::new("lccs", "lccs"));
        source.insert_class("mapbiomas_classes", "3", "Formacao Florestal");
        let lookup = Datasource::vector(source.clone()).as_class_lookup().unwrap();
        (source, lookup)
    }

    #[tokio::test]
    async fn test_literal_ignores_raw_value() {
        let resolver = ClassResolver::new(
            "prodes_amz",
            ClassificationStrategy::Literal { system: ClassificationSystem::default() },
            None,
        )
        .unwrap();

        let label = resolver.resolve(Some("Desmatamento"), Some("anything")).await.unwrap();
        assert_eq!(label, "Desmatamento");
        let label = resolver.resolve(Some("Desmatamento"), None).await.unwrap();
        assert_eq!(label, "Desmatamento");
    }

    #[tokio::test]
    async fn test_self_returns_raw_value() {
        let resolver = ClassResolver::new(
            "deter_amz",
            ClassificationStrategy::SelfValue { system: ClassificationSystem::default() },
            None,
        )
        .unwrap();

        assert_eq!(resolver.resolve(None, Some("CORTE_RASO")).await.unwrap(), "CORTE_RASO");
        let err = resolver.resolve(None, None).await.unwrap_err();
        assert!(err.is_soft());
    }

    #[tokio::test]
    async fn test_external_lookup() {
        let (source, lookup) = lookup_source();
        let resolver = ClassResolver::new("mapbiomas", external(None), Some(lookup)).unwrap();

        let label = resolver.resolve(None, Some("3")).await.unwrap();
        assert_eq!(label, "Formacao Florestal");
        assert_eq!(
            source.requests(),
            vec![RecordedRequest::GetClass {
                type_name: "lccs:mapbiomas_classes".to_string(),
                cql_filter: "class_id=3".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_external_miss_is_soft() {
        let (_, lookup) = lookup_source();
        let resolver = ClassResolver::new("mapbiomas", external(None), Some(lookup)).unwrap();

        let err = resolver.resolve(None, Some("42")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClassNotFound);
    }

    #[tokio::test]
    async fn test_unreachable_lookup_is_soft() {
        let (source, lookup) = lookup_source();
        source.set_unavailable(true);
        let resolver = ClassResolver::new("mapbiomas", external(None), Some(lookup)).unwrap();

        let err = resolver.resolve(None, Some("3")).await.unwrap_err();
        assert!(err.is_soft());
    }

    #[test]
    fn test_external_requires_lookup() {
        let err = ClassResolver::new("mapbiomas", external(Some("MapBiomas")), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
