use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::chart::{ChartConfig, TrafficChart};
use crate::error::ChartError;

#[derive(Clone)]
pub struct AppState {
    /// Chart at its default range; each request works on its own clone.
    pub chart: Arc<TrafficChart>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn bad_request(e: ChartError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

pub fn router(chart: TrafficChart) -> Router {
    let state = AppState {
        chart: Arc::new(chart),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/api/chart", get(chart_config))
        .route("/api/labels", get(labels))
        .route("/api/bounds", get(bounds))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(chart: TrafficChart, bind: SocketAddr) -> anyhow::Result<()> {
    let app = router(chart);

    info!("Listening on http://{}", bind);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_check() -> &'static str {
    "ok"
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    start: Option<String>,
    end: Option<String>,
}

async fn chart_config(
    State(st): State<AppState>,
    Query(q): Query<RangeParams>,
) -> ApiResult<ChartConfig> {
    let mut chart = (*st.chart).clone();

    // Browsers send `start=` for a cleared date input; keep the default then.
    if let Some(start) = q.start.as_deref().filter(|s| !s.is_empty()) {
        chart.set_start_date(start).map_err(bad_request)?;
    }
    if let Some(end) = q.end.as_deref().filter(|s| !s.is_empty()) {
        chart.set_end_date(end).map_err(bad_request)?;
    }

    Ok(Json(chart.config()))
}

async fn labels(State(st): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "labels": st.chart.labels() }))
}

async fn bounds(State(st): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "min": st.chart.min_date(), "max": st.chart.max_date() }))
}

const INDEX_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>API Traffic</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns@3.0.0/dist/chartjs-adapter-date-fns.bundle.min.js"></script>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            background: #f4f5fb;
            padding: 20px;
        }
        .container { width: 80%; margin: 0 auto; }
        .card {
            background: white;
            padding: 20px;
            border-radius: 12px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.1);
        }
        .chart-container {
            position: relative;
            height: 420px;
        }
        .range {
            margin-top: 16px;
            display: flex;
            gap: 10px;
            align-items: center;
            color: #333;
        }
        .range input {
            padding: 4px 8px;
            border: 1px solid #ccc;
            border-radius: 4px;
        }
        .error {
            color: #dc2626;
            font-style: italic;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="card">
            <div class="chart-container">
                <canvas id="trafficChart"></canvas>
            </div>
            <section class="range">
                <label>Select Date Range: </label>
                <input type="date" id="startDate">
                <input type="date" id="endDate">
                <span id="status" class="error"></span>
            </section>
        </div>
    </div>

    <script>
        let chart = null;
        const startInput = document.getElementById('startDate');
        const endInput = document.getElementById('endDate');
        const status = document.getElementById('status');

        async function loadChart(start, end) {
            const params = new URLSearchParams();
            if (start) params.set('start', start);
            if (end) params.set('end', end);

            try {
                const res = await fetch('/api/chart?' + params.toString());
                if (!res.ok) {
                    status.textContent = await res.text();
                    return;
                }
                status.textContent = '';
                render(await res.json());
            } catch (e) {
                status.textContent = 'Error loading data';
                console.error('Error:', e);
            }
        }

        function render(config) {
            startInput.value = config.range.start || '';
            endInput.value = config.range.end || '';

            if (chart) {
                chart.data.datasets = config.data.datasets;
                chart.update();
                return;
            }

            config.options.responsive = true;
            config.options.maintainAspectRatio = false;
            chart = new Chart(document.getElementById('trafficChart').getContext('2d'), {
                type: config.type,
                data: config.data,
                options: config.options
            });
        }

        startInput.addEventListener('change', () => loadChart(startInput.value, endInput.value));
        endInput.addEventListener('change', () => loadChart(startInput.value, endInput.value));

        loadChart();
    </script>
</body>
</html>
"#;
