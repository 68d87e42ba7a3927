use crate::errors::{AppError, AppResult};
use crate::models::{CampaignRow, ExportResponse};
use std::path::Path;

pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";
pub const CAMPAIGN_VIEW_FILE_NAME: &str = "campaign-data.csv";
pub const TABLE_FILE_NAME: &str = "export.csv";

const CAMPAIGN_VIEW_HEADERS: [&str; 9] = [
    "Campaign",
    "Impressions",
    "Clicks",
    "Conversions",
    "Revenue",
    "CTR",
    "CPC",
    "Status",
    "Date",
];

const TABLE_HEADERS: [&str; 10] = [
    "id",
    "campaign",
    "impressions",
    "clicks",
    "conversions",
    "revenue",
    "ctr",
    "cpc",
    "status",
    "date",
];

/// CSV of the rows the table currently shows, across all pages.
pub fn render_campaign_view_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a CampaignRow>,
{
    let mut lines = vec![CAMPAIGN_VIEW_HEADERS.join(",")];
    lines.extend(rows.into_iter().map(|row| {
        [
            quote(&row.campaign),
            row.impressions.to_string(),
            row.clicks.to_string(),
            row.conversions.to_string(),
            row.revenue.to_string(),
            row.ctr.to_string(),
            row.cpc.to_string(),
            row.status.as_str().to_string(),
            row.date.to_string(),
        ]
        .join(",")
    }));
    lines.join("\n")
}

/// CSV of the whole dataset, ignoring any view parameters.
pub fn render_table_csv(rows: &[CampaignRow]) -> String {
    let mut lines = vec![TABLE_HEADERS.join(",")];
    lines.extend(rows.iter().map(|row| {
        [
            row.id.clone(),
            quote(&row.campaign),
            row.impressions.to_string(),
            row.clicks.to_string(),
            row.conversions.to_string(),
            row.revenue.to_string(),
            row.ctr.to_string(),
            row.cpc.to_string(),
            row.status.as_str().to_string(),
            row.date.to_string(),
        ]
        .join(",")
    }));
    lines.join("\n")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn write_export(
    export_dir: &Path,
    file_name: &str,
    contents: &str,
    row_count: usize,
) -> AppResult<ExportResponse> {
    std::fs::create_dir_all(export_dir).map_err(|error| AppError::Io(error.to_string()))?;

    let output_path = export_dir.join(file_name);
    if output_path.parent() != Some(export_dir) {
        return Err(AppError::Io("Resolved export path escaped export directory".to_string()));
    }

    std::fs::write(&output_path, contents).map_err(|error| AppError::Io(error.to_string()))?;
    tracing::info!(path = %output_path.display(), rows = row_count, "wrote csv export");

    Ok(ExportResponse {
        path: output_path.to_string_lossy().to_string(),
        file_name: file_name.to_string(),
        mime_type: CSV_MIME_TYPE.to_string(),
        row_count,
    })
}
