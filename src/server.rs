use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::palette::ColorPalette;
use crate::pipeline::export_kml;
use crate::types::ZctaDataset;
use anyhow::{Context, Result};
use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

const KML_CONTENT_TYPE: &str = "application/vnd.google-earth.kml+xml";
const KML_DISPOSITION: &str = "attachment; filename=\"matched_zctas.kml\"";

pub struct AppState {
    pub dataset: ZctaDataset,
    pub palette: ColorPalette,
}

#[derive(Debug, Deserialize)]
pub struct ExportForm {
    #[serde(default)]
    zipdata: String,
    #[serde(default)]
    color_choice: Option<String>,
}

pub async fn start_server(config: AppConfig, dataset: ZctaDataset) -> Result<()> {
    let state = Arc::new(AppState {
        dataset,
        palette: ColorPalette::quintiles(),
    });

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/", get(form_handler).post(export_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn form_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(index_page(&state.palette))
}

async fn export_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ExportForm>,
) -> Response {
    export_response(&state, &form)
}

fn export_response(state: &AppState, form: &ExportForm) -> Response {
    let color_override = match parse_color_choice(form.color_choice.as_deref()) {
        Ok(choice) => choice,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    match export_kml(&state.dataset, &state.palette, &form.zipdata, color_override) {
        Ok(kml) => (
            [(header::CONTENT_TYPE, KML_CONTENT_TYPE), (header::CONTENT_DISPOSITION, KML_DISPOSITION)],
            kml,
        )
            .into_response(),
        Err(err) => {
            let status = match err {
                PipelineError::NoValidRows | PipelineError::NoMatches => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::InvalidOverride { .. } => StatusCode::BAD_REQUEST,
                PipelineError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!("Export rejected: {}", err);
            (status, err.to_string()).into_response()
        }
    }
}

/// Unchecked radios send nothing; anything sent must be an integer.
fn parse_color_choice(raw: Option<&str>) -> std::result::Result<Option<usize>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| format!("Color choice must be an integer, got {:?}.", value)),
    }
}

fn index_page(palette: &ColorPalette) -> String {
    let color_options: String = palette
        .fills()
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let html = color.to_html();
            format!(
                r#"<label style="margin-right: 10px;"><input type="radio" name="color_choice" value="{i}"><span style="display:inline-block;width:20px;height:20px;background-color:{html};border:1px solid #000;" title="{html}"></span></label>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>ZCTA KML Exporter</title></head>
<body>
  <h2>ZCTA KML Exporter</h2>
  <p><strong>Input Format:</strong> Each line must contain a ZIP code and population, separated by a tab or space. Example:<br>
  <code>30013[TAB]1</code></p>

  <form method="post">
    <textarea name="zipdata" rows="15" cols="50" placeholder="30013&#9;1&#10;30012&#9;1&#10;..."></textarea><br><br>

    <p><strong>Optional:</strong> Choose a single color to override quintile shading:</p>
    {color_options}
    <p style="font-size: 0.9em; margin-top: 5px;">(Leave all unchecked to use quintile-based shading)</p>

    <br><br>
    <input type="submit" value="Generate KML">
  </form>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoArea;
    use geo::{polygon, Geometry};

    fn state() -> AppState {
        let p = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        AppState {
            dataset: ZctaDataset::new(vec![GeoArea { id: "30013".to_string(), geometry: Geometry::Polygon(p) }]),
            palette: ColorPalette::quintiles(),
        }
    }

    fn form(zipdata: &str, color_choice: Option<&str>) -> ExportForm {
        ExportForm { zipdata: zipdata.to_string(), color_choice: color_choice.map(str::to_string) }
    }

    #[test]
    fn color_choice_parsing() {
        assert_eq!(parse_color_choice(None), Ok(None));
        assert_eq!(parse_color_choice(Some("")), Ok(None));
        assert_eq!(parse_color_choice(Some("3")), Ok(Some(3)));
        assert!(parse_color_choice(Some("red")).is_err());
        assert!(parse_color_choice(Some("-1")).is_err());
    }

    #[test]
    fn success_is_a_kml_download() {
        let response = export_response(&state(), &form("30013\t1", None));
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], KML_CONTENT_TYPE);
        assert_eq!(headers[header::CONTENT_DISPOSITION], KML_DISPOSITION);
    }

    #[test]
    fn failures_map_to_statuses() {
        let s = state();
        assert_eq!(export_response(&s, &form("nonsense", None)).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(export_response(&s, &form("10001\t1", None)).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(export_response(&s, &form("30013\t1", Some("7"))).status(), StatusCode::BAD_REQUEST);
        assert_eq!(export_response(&s, &form("30013\t1", Some("blue"))).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn form_shows_palette_swatches() {
        let page = index_page(&ColorPalette::quintiles());
        assert_eq!(page.matches(r#"name="color_choice""#).count(), 5);
        assert!(page.contains("background-color:#e66855"));
        assert!(page.contains(r#"name="zipdata""#));
    }
}
