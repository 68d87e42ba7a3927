pub mod dashboard;
pub mod errors;
pub mod export;
pub mod generators;
pub mod logging;
pub mod metric_update;
pub mod models;
pub mod settings;
pub mod table_view;
pub mod ticker;

#[cfg(feature = "desktop")]
pub use shell::run;

#[cfg(feature = "desktop")]
mod shell {
    use crate::dashboard::DashboardCore;
    use crate::logging::init_tracing;
    use crate::models::{
        DashboardSettings, DashboardSnapshot, ExportResponse, SortField, SortState, TableView,
        ViewParameters,
    };
    use std::sync::Arc;
    use tauri::{Emitter, Manager};
    use tokio::sync::broadcast::error::RecvError;

    #[derive(Clone)]
    struct AppState {
        dashboard: Arc<DashboardCore>,
    }

    #[tauri::command]
    async fn dashboard_snapshot(state: tauri::State<'_, AppState>) -> Result<DashboardSnapshot, String> {
        Ok(state.dashboard.snapshot().await)
    }

    #[tauri::command]
    async fn dashboard_refresh(state: tauri::State<'_, AppState>) -> Result<DashboardSnapshot, String> {
        Ok(state.dashboard.refresh().await)
    }

    #[tauri::command]
    async fn campaign_table_view(
        state: tauri::State<'_, AppState>,
        params: ViewParameters,
    ) -> Result<TableView, String> {
        Ok(state.dashboard.table_view(&params).await)
    }

    #[tauri::command]
    fn campaign_sort_cycle(sort: SortState, field: SortField) -> SortState {
        sort.cycle(field)
    }

    #[tauri::command]
    async fn campaign_export_view(
        state: tauri::State<'_, AppState>,
        params: ViewParameters,
    ) -> Result<ExportResponse, String> {
        state
            .dashboard
            .export_campaign_view(&params)
            .await
            .map_err(to_client_error)
    }

    #[tauri::command]
    async fn campaign_export_all(state: tauri::State<'_, AppState>) -> Result<ExportResponse, String> {
        state.dashboard.export_table().await.map_err(to_client_error)
    }

    #[tauri::command]
    async fn get_settings(state: tauri::State<'_, AppState>) -> Result<DashboardSettings, String> {
        Ok(state.dashboard.settings().await)
    }

    #[tauri::command]
    async fn update_settings(
        state: tauri::State<'_, AppState>,
        update: serde_json::Value,
    ) -> Result<DashboardSettings, String> {
        state
            .dashboard
            .update_settings(update)
            .await
            .map_err(to_client_error)
    }

    pub fn run() {
        tauri::Builder::default()
            .setup(|app| {
                let app_data_dir = app.path().app_data_dir().map_err(|error| error.to_string())?;
                std::fs::create_dir_all(&app_data_dir).map_err(|error| error.to_string())?;
                init_tracing(&app_data_dir).map_err(|error| error.to_string())?;

                let dashboard = DashboardCore::new(app_data_dir).map_err(|error| error.to_string())?;
                let handle = app.handle().clone();

                tauri::async_runtime::spawn({
                    let mut events = dashboard.subscribe();
                    async move {
                        loop {
                            match events.recv().await {
                                Ok(event) => {
                                    if let Err(error) = handle.emit("dashboard_event", event) {
                                        tracing::warn!(error = %error, "failed to forward dashboard event");
                                    }
                                }
                                Err(RecvError::Lagged(skipped)) => {
                                    tracing::warn!(skipped, "dashboard event forwarder lagged");
                                }
                                Err(RecvError::Closed) => break,
                            }
                        }
                    }
                });

                tauri::async_runtime::spawn({
                    let dashboard = dashboard.clone();
                    async move {
                        dashboard.start_updates().await;
                    }
                });

                app.manage(AppState { dashboard });
                Ok(())
            })
            .on_window_event(|window, event| {
                if let tauri::WindowEvent::Destroyed = event {
                    if let Some(state) = window.try_state::<AppState>() {
                        state.dashboard.stop_updates();
                    }
                }
            })
            .invoke_handler(tauri::generate_handler![
                dashboard_snapshot,
                dashboard_refresh,
                campaign_table_view,
                campaign_sort_cycle,
                campaign_export_view,
                campaign_export_all,
                get_settings,
                update_settings
            ])
            .run(tauri::generate_context!())
            .expect("failed to run tauri app");
    }

    fn to_client_error(error: impl std::fmt::Display) -> String {
        error.to_string()
    }
}
