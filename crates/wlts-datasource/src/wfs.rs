//! WFS 1.0.0 feature service client

use std::time::Duration;

use async_trait::async_trait;
use geojson::GeoJson;
use reqwest::Url;
use wlts_core::catalog::DatasourceDefinition;
use wlts_core::error::Result;
use wlts_geo::from_geojson_geometry;

use crate::http::{OgcHttp, Params};
use crate::models::{ClassLookupRequest, FeatureQuery, FeatureRecord};
use crate::ports::VectorSource;
use crate::xml;

/// Client for a WFS endpoint at `{host}/wfs`
#[derive(Debug, Clone)]
pub struct WfsClient {
    http: OgcHttp,
    workspace: String,
}

impl WfsClient {
    pub fn new(definition: &DatasourceDefinition, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: OgcHttp::new(definition, "wfs", "WFS", timeout)?,
            workspace: definition.workspace.clone(),
        })
    }

    fn capabilities_params() -> Params {
        vec![("request", "GetCapabilities".to_string())]
    }

    fn feature_params(query: &FeatureQuery) -> Result<Params> {
        Ok(vec![
            ("request", "GetFeature".to_string()),
            ("typeName", query.type_name.clone()),
            ("outputFormat", "application/json".to_string()),
            ("srsName", format!("EPSG:{}", query.srid)),
            ("CQL_FILTER", query.cql_filter()?),
        ])
    }

    fn class_params(request: &ClassLookupRequest) -> Params {
        vec![
            ("request", "GetFeature".to_string()),
            ("typeName", request.type_name.clone()),
            ("CQL_FILTER", request.cql_filter()),
        ]
    }

    pub fn feature_url(&self, query: &FeatureQuery) -> Result<Url> {
        self.http.url(Self::feature_params(query)?)
    }

    pub fn class_url(&self, request: &ClassLookupRequest) -> Result<Url> {
        self.http.url(Self::class_params(request))
    }

    fn parse_features(&self, body: &str) -> Result<Vec<FeatureRecord>> {
        let geojson = body.parse::<GeoJson>().map_err(|e| {
            let reason = xml::service_exception(body).unwrap_or_else(|| e.to_string());
            self.http.invalid(format!("GetFeature: {}", reason))
        })?;

        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(self.http.invalid("GetFeature returned a bare geometry"));
            }
        };

        let records = features
            .into_iter()
            .map(|feature| {
                let geometry = feature.geometry.and_then(|g| match from_geojson_geometry(g) {
                    Ok(geometry) => Some(geometry),
                    Err(e) => {
                        tracing::warn!(datasource = %self.http.datasource(), error = %e, "Dropping feature geometry");
                        None
                    }
                });
                FeatureRecord::new(feature.properties.unwrap_or_default(), geometry)
            })
            .collect();

        Ok(records)
    }
}

#[async_trait]
impl VectorSource for WfsClient {
    fn id(&self) -> &str {
        self.http.datasource()
    }

    fn workspace(&self) -> &str {
        &self.workspace
    }

    async fn feature_types(&self) -> Result<Vec<String>> {
        let body = self.http.get_text(Self::capabilities_params()).await?;
        xml::feature_type_names(&body).map_err(|e| self.http.invalid(e.to_string()))
    }

    async fn get_features(&self, query: &FeatureQuery) -> Result<Vec<FeatureRecord>> {
        let body = self.http.get_text(Self::feature_params(query)?).await?;
        let records = self.parse_features(&body)?;

        tracing::debug!(
            datasource = %self.http.datasource(),
            type_name = %query.type_name,
            records = records.len(),
            "GetFeature"
        );

        Ok(records)
    }

    async fn get_class(&self, request: &ClassLookupRequest) -> Result<Option<String>> {
        let body = self.http.get_text(Self::class_params(request)).await?;
        if let Some(message) = xml::service_exception(&body) {
            return Err(self.http.invalid(format!("class lookup: {}", message)));
        }
        xml::first_element_text(&body, &request.class_property_name)
            .map_err(|e| self.http.invalid(e.to_string()))
    }
}
