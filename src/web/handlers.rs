//! HTTP handlers for the dashboard and API endpoints.

use crate::web::router::AppState;
use axum::extract::State;
use axum::response::{Html, Json};
use serde_json::json;

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "gpio-viewer",
        "version": env!("CARGO_PKG_VERSION"),
        "observers": state.lifecycle.observer_count(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Monitored pins and how they are sampled.
pub async fn list_pins(State(state): State<AppState>) -> Json<serde_json::Value> {
    let pins: Vec<serde_json::Value> = state
        .registry
        .iter()
        .map(|pin| {
            let header = state.board.pin(pin.number());
            json!({
                "gpio": pin.number(),
                "header_pin": header.map(|p| p.header_pin),
                "label": header.map(|p| p.label.clone()),
            })
        })
        .collect();

    Json(json!({
        "board": state.board.name,
        "sampling_interval_ms": state.config.sampling_interval_ms,
        "ws_path": state.config.web.ws_path,
        "pins": pins,
    }))
}

/// Dashboard page with one indicator per monitored pin.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state))
}

/// Build the dashboard HTML.
///
/// Indicators are laid out by header position. Pins not on the board's
/// header are appended in registry order.
pub fn render_index(state: &AppState) -> String {
    let mut indicators = String::new();
    for pin in state.registry.iter() {
        let label = state
            .board
            .pin(pin.number())
            .map(|p| format!("{} (pin {})", p.label, p.header_pin))
            .unwrap_or_else(|| format!("GPIO{}", pin));
        indicators.push_str(&format!(
            "<div class='pin'><span class='indicator-off' id='gpio{pin}'></span>{label}</div>\n"
        ));
    }

    format!(
        "{head}<body>\n<h1>{title}</h1>\n<div class='pins'>\n{indicators}</div>\n\
         <script>var serverPort = {port}; var wsPath = '{ws_path}';</script>\n{script}</body></html>",
        head = INDEX_HEAD,
        title = state.board.title,
        indicators = indicators,
        port = state.config.web.port,
        ws_path = state.config.web.ws_path,
        script = INDEX_SCRIPT,
    )
}

const INDEX_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>GPIO Viewer</title>
<style>
body { font-family: sans-serif; background: #1e1e1e; color: #ddd; padding: 20px; }
.pins { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 8px; }
.pin { display: flex; align-items: center; gap: 8px; }
.indicator-off, .indicator-on { width: 14px; height: 14px; border-radius: 50%; display: inline-block; }
.indicator-off { background: #444; }
.indicator-on { background: #4caf50; box-shadow: 0 0 6px #4caf50; }
</style>
</head>
"#;

const INDEX_SCRIPT: &str = r#"<script>
(function () {
  var url = 'ws://' + window.location.hostname + ':' + serverPort + wsPath;
  function connect() {
    var ws = new WebSocket(url);
    ws.onmessage = function (event) {
      var states = JSON.parse(event.data);
      for (var gpio in states) {
        var el = document.getElementById('gpio' + gpio);
        if (el) { el.className = states[gpio] === 1 ? 'indicator-on' : 'indicator-off'; }
      }
    };
    ws.onclose = function () { setTimeout(connect, 1000); };
  }
  connect();
})();
</script>
"#;
