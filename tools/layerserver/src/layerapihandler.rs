use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use agririsk::{
    AdminLevel, BoundaryLayer, BoundarySelector, DistrictsLayer, RasterCompositor,
    response::{self, OutputVariant, SuccessResponse},
};

use crate::{AppError, Error, Result};

/// Body of the layer requests
#[derive(Debug, Clone, Deserialize)]
pub struct LayerRequest {
    pub admin_level: AdminLevel,
    #[serde(default)]
    pub admin_level_id: Option<u32>,
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub color_ramp: Vec<String>,
}

impl LayerRequest {
    fn selector(&self) -> Result<BoundarySelector> {
        BoundarySelector::from_admin_level(self.admin_level, self.admin_level_id)
    }

    fn source_file(&self) -> Result<String> {
        self.source_file
            .clone()
            .ok_or_else(|| Error::InvalidArgument("Missing source_file".into()))
    }
}

struct State {
    compositor: RasterCompositor,
}

/// A rendered geotiff served inline
struct GeoTiffResponse {
    download_name: String,
    data: Vec<u8>,
}

impl IntoResponse for GeoTiffResponse {
    fn into_response(self) -> Response {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, response::GEOTIFF_CONTENT_TYPE)
            .header(header::CONTENT_DISPOSITION, response::content_disposition(&self.download_name))
            .header(header::ACCESS_CONTROL_EXPOSE_HEADERS, "Content-Disposition")
            .header("X-Accel-Buffering", "no")
            .body(Body::from(self.data))
            .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, "Failed to create response").into_response())
    }
}

fn parse_request(request: std::result::Result<Json<LayerRequest>, JsonRejection>) -> Result<LayerRequest> {
    match request {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => Err(Error::InvalidArgument(format!("Invalid request: {}", rejection.body_text()))),
    }
}

/// Runs the raster work on the blocking thread pool
async fn run_blocking<T, F>(state: &Arc<State>, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&RasterCompositor) -> Result<T> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || work(&state.compositor))
        .await
        .map_err(|err| Error::Runtime(format!("Layer processing task failed: {err}")))?
}

async fn geojson(
    state: axum::Extension<Arc<State>>,
    request: std::result::Result<Json<LayerRequest>, JsonRejection>,
) -> std::result::Result<Json<SuccessResponse<BoundaryLayer>>, AppError> {
    let selector = parse_request(request)?.selector()?;
    let layer = run_blocking(&state, move |compositor| compositor.boundaries().boundary_layer(selector)).await?;
    Ok(Json(SuccessResponse::new(layer)))
}

async fn geojson_districts(
    state: axum::Extension<Arc<State>>,
    request: std::result::Result<Json<LayerRequest>, JsonRejection>,
) -> std::result::Result<Json<SuccessResponse<DistrictsLayer>>, AppError> {
    let country_id = parse_request(request)?
        .admin_level_id
        .ok_or_else(|| Error::InvalidArgument("Missing admin_level_id".into()))?;
    let layer = run_blocking(&state, move |compositor| compositor.boundaries().country_districts(country_id)).await?;
    Ok(Json(SuccessResponse::new(layer)))
}

async fn render_geotiff(state: &Arc<State>, request: LayerRequest, variant: OutputVariant) -> Result<GeoTiffResponse> {
    let selector = request.selector()?;
    let source_file = request.source_file()?;
    let ramp = request.color_ramp;

    let file = source_file.clone();
    let layer = run_blocking(state, move |compositor| compositor.render(selector, &file, variant, &ramp)).await?;

    let download_name = response::download_file_name(&layer.label, &source_file, variant);
    let data = layer.tiff.into_inner();
    log::info!("Serving {download_name} ({} bytes)", data.len());
    Ok(GeoTiffResponse { download_name, data })
}

async fn geotiff(
    state: axum::Extension<Arc<State>>,
    request: std::result::Result<Json<LayerRequest>, JsonRejection>,
) -> std::result::Result<GeoTiffResponse, AppError> {
    Ok(render_geotiff(&state, parse_request(request)?, OutputVariant::Colorized).await?)
}

async fn geotiff_raw(
    state: axum::Extension<Arc<State>>,
    request: std::result::Result<Json<LayerRequest>, JsonRejection>,
) -> std::result::Result<GeoTiffResponse, AppError> {
    Ok(render_geotiff(&state, parse_request(request)?, OutputVariant::Raw).await?)
}

pub fn create_router(compositor: RasterCompositor) -> axum::routing::Router {
    axum::Router::new()
        .route("/layers/geojson", post(geojson))
        .route("/layers/geojson/districts_c", post(geojson_districts))
        .route("/layers/geotiff", post(geotiff))
        .route("/layers/geotiff/raw", post(geotiff_raw))
        .layer(axum::Extension(Arc::new(State { compositor })))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::http::Request;
    use geo::{
        CellSize, Columns, GeoReference, Point, RasterSize, Rows,
        geotiff::{CogWriteOptions, ProjectionInfo, write_cog_band},
    };
    use tower::ServiceExt;

    use agririsk::{Config, StaticRegionCatalog};

    use super::*;

    fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
        std::fs::create_dir_all(path.parent().expect("parent dir")).expect("create dir");
        std::fs::write(path, contents).expect("write file");
    }

    fn router(dir: &Path) -> axum::routing::Router {
        let geo_ref = GeoReference::with_top_left_origin(
            Some(ProjectionInfo::geographic(4326)),
            RasterSize::with_rows_cols(Rows(4), Columns(4)),
            Point::new(78.0, 10.0),
            CellSize::square(1.0),
            None,
        );
        let data: Vec<f64> = (0..16).map(|v| f64::from(v % 3)).collect();
        let tiff = write_cog_band(&geo_ref, &data, &CogWriteOptions::default()).expect("cog");
        write_file(&dir.join("data/risk/flood.tif"), tiff);
        write_file(
            &dir.join("geojson/sa_countries/country_2.geojson"),
            r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
                "coordinates": [[[79.0, 7.0], [81.0, 7.0], [81.0, 9.0], [79.0, 9.0], [79.0, 7.0]]]}}"#,
        );

        let catalog = StaticRegionCatalog::new().with_country(2, "Sri Lanka");
        let config = Config::new(dir.join("data"), dir.join("geojson"));
        create_router(RasterCompositor::new(config, Arc::new(catalog)))
    }

    async fn post_json(router: axum::routing::Router, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        router.oneshot(request).await.expect("response")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn geotiff_download() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let response = post_json(
            router(dir.path()),
            "/layers/geotiff",
            r##"{"admin_level": "country", "admin_level_id": 2, "source_file": "risk/flood.tif", "color_ramp": ["#ff0000", "#00ff00"]}"##,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/tiff");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"Sri_Lanka_flood.tif.tif\""
        );
    }

    #[tokio::test]
    async fn geojson_layer() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let response = post_json(router(dir.path()), "/layers/geojson", r#"{"admin_level": "country", "admin_level_id": 2}"#).await;

        let json = body_json(response).await;
        assert_eq!(json["success"], 1);
        assert_eq!(json["data"]["region"], serde_json::json!(["Sri Lanka"]));
        assert_eq!(json["data"]["bbox"], serde_json::json!([79.0, 7.0, 81.0, 9.0]));
    }

    #[tokio::test]
    async fn failures_use_the_envelope() {
        let dir = tempfile::TempDir::new().expect("temp dir");

        let response = post_json(
            router(dir.path()),
            "/layers/geotiff/raw",
            r#"{"admin_level": "country", "admin_level_id": 2, "source_file": "risk/missing.tif"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], 0);
        assert_eq!(json["message"], "The requested raster data file is unavailable");

        let response = post_json(router(dir.path()), "/layers/geojson", r#"{"admin_level": "state", "admin_level_id": 9999}"#).await;
        assert_eq!(body_json(response).await["success"], 0);

        let response = post_json(router(dir.path()), "/layers/geojson", "not json").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], 0);
    }
}
