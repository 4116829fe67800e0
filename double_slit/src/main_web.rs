//! Web view
//!
//! Serves a small form plus two endpoints: `/plot` renders the figure for the
//! requested slit count, spacing, velocity and time as PNG, and `/density`
//! returns the averaged detector profile as JSON.

use axum::{
    extract::Query,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use double_slit::render::{encode_png, render_figure, Colormap};
use double_slit::{superpose, Detector, FieldError, SceneConfig};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::net::SocketAddr;

/// Upper bound on the slit count a request may ask for
const MAX_SLITS: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "double_slit_web")]
#[command(about = "HTTP server for multi-slit interference figures")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, short = 'p', default_value = "8080")]
    port: u16,
}

#[derive(Debug, Default, Deserialize)]
struct PlotQuery {
    n: Option<usize>,
    d: Option<f64>,
    v: Option<f64>,
    t: Option<f64>,
}

impl PlotQuery {
    /// Web preset with the query's values, defaults n=2 d=2 v=1 t=0
    fn scene(&self) -> double_slit::Result<SceneConfig> {
        let n = self.n.unwrap_or(2);
        let d = self.d.unwrap_or(2.0);
        let v = self.v.unwrap_or(1.0);
        let t = self.t.unwrap_or(0.0);

        if n == 0 || n > MAX_SLITS {
            return Err(FieldError::invalid(format!(
                "n must be between 1 and {MAX_SLITS}, got {n}"
            )));
        }
        for (name, value) in [("d", d), ("v", v), ("t", t)] {
            if !value.is_finite() {
                return Err(FieldError::invalid(format!("{name} must be finite")));
            }
        }

        let mut scene = SceneConfig::web(n, d, v);
        scene.time = t;
        Ok(scene)
    }
}

#[derive(Debug, Serialize)]
struct DensityResponse {
    t: f64,
    xs: Vec<f64>,
    profile: Vec<f64>,
    max: f64,
}

const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Multi-Slit Interference</title>
    <style>
      body { margin: 0; padding: 16px; background: #0b0c10; color: #e6e6e6; font-family: "Segoe UI", sans-serif; }
      form { display: flex; gap: 12px; align-items: center; flex-wrap: wrap; }
      label { font-size: 12px; color: #a7b0ba; }
      input { background: #0f141b; color: #e6e6e6; border: 1px solid #2a2f36; border-radius: 6px; padding: 4px 6px; width: 64px; }
      button { background: #1a2736; color: #e6e6e6; border: 1px solid #3c6a9e; border-radius: 6px; padding: 6px 10px; cursor: pointer; }
      img { margin-top: 16px; max-width: 100%; }
    </style>
  </head>
  <body>
    <form id="params">
      <label>slits <input name="n" type="number" min="1" max="32" value="2" /></label>
      <label>spacing <input name="d" type="number" step="0.1" value="2.0" /></label>
      <label>velocity <input name="v" type="number" step="0.1" value="1.0" /></label>
      <label>time <input name="t" type="number" step="0.05" value="0.0" /></label>
      <button type="submit">Plot</button>
    </form>
    <img id="plot" src="/plot?n=2&d=2.0&v=1.0&t=0.0" alt="interference figure" />
    <script>
      const form = document.getElementById("params");
      form.addEventListener("submit", (event) => {
        event.preventDefault();
        const query = new URLSearchParams(new FormData(form)).toString();
        document.getElementById("plot").src = "/plot?" + query;
      });
    </script>
  </body>
</html>
"##;

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

fn error_response(e: FieldError) -> Response {
    if e.is_invalid_parameter() {
        log::warn!("rejected request: {e}");
        (StatusCode::BAD_REQUEST, e.to_string()).into_response()
    } else {
        log::error!("request failed: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
    }
}

/// Evaluate off the async workers; the grid sum is CPU bound
async fn evaluate<T, F>(query: PlotQuery, f: F) -> Response
where
    T: IntoResponse,
    F: FnOnce(SceneConfig) -> double_slit::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let scene = match query.scene() {
        Ok(scene) => scene,
        Err(e) => return error_response(e),
    };
    match tokio::task::spawn_blocking(move || f(scene)).await {
        Ok(Ok(body)) => body.into_response(),
        Ok(Err(e)) => error_response(e),
        Err(e) => {
            log::error!("evaluation task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn plot(Query(q): Query<PlotQuery>) -> Response {
    evaluate(q, |scene| {
        let field = superpose(&scene.request()?)?;
        let png = encode_png(&render_figure(&field, &scene.display, Colormap::Gray))?;
        Ok(([(header::CONTENT_TYPE, "image/png")], png))
    })
    .await
}

async fn density(Query(q): Query<PlotQuery>) -> Response {
    evaluate(q, |scene| {
        let field = superpose(&scene.request()?)?;
        Ok(Json(DensityResponse {
            t: scene.time,
            xs: field.grid().xs().to_vec(),
            profile: field.detector(Detector::Average),
            max: field.max().0,
        }))
    })
    .await
}

fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plot", get(plot))
        .route("/density", get(density))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("serving on http://{addr}");
    axum::serve(listener, router()).await?;

    Ok(())
}
