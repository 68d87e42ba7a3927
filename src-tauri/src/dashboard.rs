use crate::errors::AppResult;
use crate::export::{
    render_campaign_view_csv, render_table_csv, write_export, CAMPAIGN_VIEW_FILE_NAME, TABLE_FILE_NAME,
};
use crate::generators::{
    generate_bar_chart_data, generate_donut_chart_data, generate_line_chart_data, generate_metrics,
    generate_table_data, generate_trending_bar_chart_data, generate_trending_line_chart_data,
    generate_trending_metrics,
};
use crate::models::{
    DashboardEvent, DashboardEventType, DashboardSettings, DashboardSnapshot, ExportResponse, PageSize,
    TableView, ViewParameters,
};
use crate::settings::SettingsStore;
use crate::table_view::{filter_and_sort, view};
use crate::ticker::{TickFuture, TickKind, TickerTiming, UpdateTicker};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 64;

struct DashboardState {
    snapshot: DashboardSnapshot,
    rng: StdRng,
    settings: DashboardSettings,
}

/// Holds the current dataset and applies refreshes and trending updates to it.
/// Every change swaps whole datasets under one lock.
pub struct DashboardCore {
    state: Mutex<DashboardState>,
    settings_store: SettingsStore,
    ticker: UpdateTicker,
    events: broadcast::Sender<DashboardEvent>,
    event_seq: AtomicU64,
    app_data_dir: PathBuf,
}

impl DashboardCore {
    pub fn new(app_data_dir: PathBuf) -> AppResult<Arc<Self>> {
        let settings_store = SettingsStore::new(&app_data_dir);
        let settings = settings_store.load()?;
        let mut rng = seeded_rng(settings.rng_seed);
        let snapshot = generate_snapshot(&mut rng, Utc::now(), 0);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let this = Arc::new(Self {
            state: Mutex::new(DashboardState {
                snapshot,
                rng,
                settings,
            }),
            settings_store,
            ticker: UpdateTicker::new(),
            events,
            event_seq: AtomicU64::new(0),
            app_data_dir,
        });

        let weak = Arc::downgrade(&this);
        this.ticker.set_handler(Arc::new(move |kind: TickKind| -> TickFuture {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(strong) = weak.upgrade() {
                    strong.handle_tick(kind).await;
                }
            })
        }));

        Ok(this)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Starts the timers: the load delay first (unless already loaded), then recurring updates.
    pub async fn start_updates(&self) {
        let timing = {
            let state = self.state.lock().await;
            ticker_timing(&state.settings, state.snapshot.is_loading)
        };
        self.ticker.start(timing);
    }

    pub fn stop_updates(&self) {
        self.ticker.stop();
    }

    pub fn updates_running(&self) -> bool {
        self.ticker.is_running()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Regenerates every dataset at once and pushes the next timed update a full interval out.
    pub async fn refresh(&self) -> DashboardSnapshot {
        let snapshot = {
            let mut state = self.state.lock().await;
            let revision = state.snapshot.revision + 1;
            let is_loading = state.snapshot.is_loading;
            let mut snapshot = generate_snapshot(&mut state.rng, Utc::now(), revision);
            snapshot.is_loading = is_loading;
            state.snapshot = snapshot.clone();
            snapshot
        };
        self.ticker.reset_interval();

        tracing::info!(revision = snapshot.revision, "dashboard refreshed");
        self.emit(DashboardEventType::DashboardRefreshed, json!(snapshot));
        snapshot
    }

    /// Evolves metrics, line and bar data. Donut and table stay as they are.
    pub async fn apply_trending_update(&self) -> AppResult<DashboardSnapshot> {
        let snapshot = {
            let mut state = self.state.lock().await;
            let DashboardState { snapshot, rng, .. } = &mut *state;
            let metrics = generate_trending_metrics(rng, &snapshot.metrics)?;
            snapshot.metrics = metrics;
            snapshot.line_chart = generate_trending_line_chart_data(rng);
            snapshot.bar_chart = generate_trending_bar_chart_data(rng);
            snapshot.last_updated = Utc::now();
            snapshot.revision += 1;
            snapshot.clone()
        };

        tracing::debug!(revision = snapshot.revision, "applied trending update");
        self.emit(
            DashboardEventType::DashboardUpdated,
            json!({
                "metrics": snapshot.metrics,
                "lineChart": snapshot.line_chart,
                "barChart": snapshot.bar_chart,
                "lastUpdated": snapshot.last_updated,
                "revision": snapshot.revision,
            }),
        );
        Ok(snapshot)
    }

    pub async fn mark_loaded(&self) -> DashboardSnapshot {
        let (snapshot, changed) = {
            let mut state = self.state.lock().await;
            let changed = state.snapshot.is_loading;
            state.snapshot.is_loading = false;
            (state.snapshot.clone(), changed)
        };

        if changed {
            tracing::info!(revision = snapshot.revision, "dashboard finished loading");
            self.emit(
                DashboardEventType::DashboardLoaded,
                json!({ "lastUpdated": snapshot.last_updated, "revision": snapshot.revision }),
            );
        }
        snapshot
    }

    pub async fn default_view_parameters(&self) -> ViewParameters {
        let state = self.state.lock().await;
        ViewParameters {
            page_size: PageSize::try_from(state.settings.default_page_size).unwrap_or_default(),
            ..ViewParameters::default()
        }
    }

    pub async fn table_view(&self, params: &ViewParameters) -> TableView {
        let state = self.state.lock().await;
        view(&state.snapshot.table, params)
    }

    /// Exports the filtered and sorted rows of every page to `campaign-data.csv`.
    pub async fn export_campaign_view(&self, params: &ViewParameters) -> AppResult<ExportResponse> {
        let (contents, row_count, export_dir) = {
            let state = self.state.lock().await;
            let rows = filter_and_sort(&state.snapshot.table, params);
            (
                render_campaign_view_csv(rows.iter().copied()),
                rows.len(),
                state.settings.resolved_export_dir(&self.app_data_dir),
            )
        };
        write_export(&export_dir, CAMPAIGN_VIEW_FILE_NAME, &contents, row_count)
    }

    /// Exports the full table to `export.csv`, ignoring view parameters.
    pub async fn export_table(&self) -> AppResult<ExportResponse> {
        let (contents, row_count, export_dir) = {
            let state = self.state.lock().await;
            (
                render_table_csv(&state.snapshot.table),
                state.snapshot.table.len(),
                state.settings.resolved_export_dir(&self.app_data_dir),
            )
        };
        write_export(&export_dir, TABLE_FILE_NAME, &contents, row_count)
    }

    pub async fn settings(&self) -> DashboardSettings {
        self.state.lock().await.settings.clone()
    }

    pub async fn update_settings(&self, update: serde_json::Value) -> AppResult<DashboardSettings> {
        let (settings, timing) = {
            let mut state = self.state.lock().await;
            let settings = self.settings_store.apply_update(&state.settings, update)?;
            if settings.rng_seed != state.settings.rng_seed {
                state.rng = seeded_rng(settings.rng_seed);
            }
            state.settings = settings.clone();
            (settings, ticker_timing(&state.settings, state.snapshot.is_loading))
        };

        if self.ticker.is_running() {
            self.ticker.start(timing);
        }
        tracing::info!(
            update_interval_secs = settings.update_interval_secs,
            default_page_size = settings.default_page_size,
            "settings updated"
        );
        self.emit(DashboardEventType::SettingsUpdated, json!(settings));
        Ok(settings)
    }

    async fn handle_tick(&self, kind: TickKind) {
        match kind {
            TickKind::Loaded => {
                self.mark_loaded().await;
            }
            TickKind::Update => {
                if let Err(error) = self.apply_trending_update().await {
                    tracing::warn!(error = %error, "trending update failed");
                }
            }
        }
    }

    fn emit(&self, event_type: DashboardEventType, payload: serde_json::Value) {
        let event = DashboardEvent {
            event_id: Uuid::new_v4().to_string(),
            r#type: event_type,
            payload,
            timestamp: Utc::now(),
            seq: self.event_seq.fetch_add(1, Ordering::SeqCst) + 1,
        };
        tracing::debug!(event = event_type.as_str(), seq = event.seq, "dashboard event");
        // no subscribers is fine; the webview may not be attached yet
        let _ = self.events.send(event);
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn ticker_timing(settings: &DashboardSettings, is_loading: bool) -> TickerTiming {
    TickerTiming {
        initial_delay: is_loading.then(|| settings.initial_load_delay()),
        interval: settings.update_interval(),
    }
}

fn generate_snapshot(rng: &mut StdRng, now: DateTime<Utc>, revision: u64) -> DashboardSnapshot {
    DashboardSnapshot {
        metrics: generate_metrics(rng),
        line_chart: generate_line_chart_data(rng),
        bar_chart: generate_bar_chart_data(),
        donut_chart: generate_donut_chart_data(),
        table: generate_table_data(rng, now),
        last_updated: now,
        is_loading: true,
        revision,
    }
}
