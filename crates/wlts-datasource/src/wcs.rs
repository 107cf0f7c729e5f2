//! WCS 1.0.0 coverage service client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use wlts_core::catalog::DatasourceDefinition;
use wlts_core::error::Result;

use crate::http::{OgcHttp, Params};
use crate::models::CoverageRequest;
use crate::ports::RasterSource;
use crate::raster::GeoRaster;
use crate::xml;

/// Client for a WCS endpoint at `{host}/wcs`
#[derive(Debug, Clone)]
pub struct WcsClient {
    http: OgcHttp,
    workspace: String,
}

impl WcsClient {
    pub fn new(definition: &DatasourceDefinition, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: OgcHttp::new(definition, "wcs", "WCS", timeout)?,
            workspace: definition.workspace.clone(),
        })
    }

    fn coverage_params(request: &CoverageRequest) -> Params {
        vec![
            ("request", "GetCoverage".to_string()),
            ("COVERAGE", request.coverage.clone()),
            ("CRS", format!("EPSG:{}", request.srid)),
            ("BBOX", request.bbox.to_query_value()),
            ("FORMAT", "GeoTIFF".to_string()),
            ("WIDTH", request.grid.columns.to_string()),
            ("HEIGHT", request.grid.rows.to_string()),
            ("TIME", request.time.clone()),
        ]
    }

    pub fn coverage_url(&self, request: &CoverageRequest) -> Result<Url> {
        self.http.url(Self::coverage_params(request))
    }
}

#[async_trait]
impl RasterSource for WcsClient {
    fn id(&self) -> &str {
        self.http.datasource()
    }

    fn workspace(&self) -> &str {
        &self.workspace
    }

    async fn coverages(&self) -> Result<Vec<String>> {
        let body = self.http.get_text(vec![("request", "GetCapabilities".to_string())]).await?;
        xml::coverage_names(&body).map_err(|e| self.http.invalid(e.to_string()))
    }

    async fn sample(&self, request: &CoverageRequest) -> Result<Option<f64>> {
        let bytes = self.http.get_bytes(Self::coverage_params(request)).await?;

        match GeoRaster::decode(&bytes) {
            Ok(raster) => Ok(raster.sample(request.x, request.y)),
            Err(e) => {
                let message = std::str::from_utf8(&bytes).ok().and_then(xml::service_exception);
                tracing::warn!(
                    datasource = %self.http.datasource(),
                    coverage = %request.coverage,
                    time = %request.time,
                    error = %e,
                    exception = ?message,
                    "Coverage could not be decoded"
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GridShape;
    use wlts_core::catalog::DatasourceKind;
    use wlts_core::models::BoundingBox;

    #[test]
    fn test_coverage_url() {
        let definition = DatasourceDefinition {
            id: "mapbiomas_wcs".to_string(),
            kind: DatasourceKind::Wcs,
            host: "http://localhost/geoserver".to_string(),
            workspace: "mapbiomas".to_string(),
            user: Some("reader".to_string()),
            password: Some("secret".to_string()),
        };
        let client = WcsClient::new(&definition, Duration::from_secs(5)).unwrap();

        let request = CoverageRequest::new(
            "mapbiomas:amazonia",
            4326,
            BoundingBox::around(-66.0, -9.0, 0.5),
            GridShape { columns: 2, rows: 3 },
            "2019",
            (-66.0, -9.0),
        )
        .unwrap();

        let url = client.coverage_url(&request).unwrap();
        assert_eq!(url.path(), "/geoserver/wcs");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("service".to_string(), "WCS".to_string())));
        assert!(pairs.contains(&("BBOX".to_string(), "-66.5,-9.5,-65.5,-8.5".to_string())));
        assert!(pairs.contains(&("WIDTH".to_string(), "2".to_string())));
        assert!(pairs.contains(&("HEIGHT".to_string(), "3".to_string())));
        assert!(pairs.contains(&("TIME".to_string(), "2019".to_string())));
    }
}
