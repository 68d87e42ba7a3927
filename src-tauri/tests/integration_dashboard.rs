use admybrand_insights_lib::dashboard::DashboardCore;
use admybrand_insights_lib::export::render_campaign_view_csv;
use admybrand_insights_lib::generators::{generate_table_data, generate_trending_metrics, generate_metrics};
use admybrand_insights_lib::metric_update::{parse_metric_value, update_metric_value};
use admybrand_insights_lib::models::{
    ChangeType, PageSize, SortDirection, SortField, SortState, StatusFilter, ViewParameters,
};
use admybrand_insights_lib::table_view::{clamp_page, filter_and_sort, view};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn browsing_the_campaign_table_like_the_ui_does() {
    let mut rng = StdRng::seed_from_u64(2024);
    let rows = generate_table_data(&mut rng, Utc::now());
    let ids: HashSet<_> = rows.iter().map(|row| row.id.clone()).collect();
    assert_eq!(ids.len(), rows.len());

    let mut params = ViewParameters {
        page_size: PageSize::try_from(5).expect("page size"),
        ..ViewParameters::default()
    };

    params.sort = params.sort.cycle(SortField::Impressions);
    params.sort = params.sort.cycle(SortField::Impressions);
    assert_eq!(params.sort.active(), Some((SortField::Impressions, SortDirection::Desc)));

    let first_page = view(&rows, &params);
    assert_eq!(first_page.total_pages, 10);
    assert_eq!(first_page.rows.len(), 5);
    assert!(first_page
        .rows
        .windows(2)
        .all(|pair| pair[0].impressions >= pair[1].impressions));

    params.sort = params.sort.cycle(SortField::Campaign);
    assert_eq!(params.sort.active(), Some((SortField::Campaign, SortDirection::Asc)));

    params.status_filter = StatusFilter::Ended;
    params.page = 99;
    let beyond = view(&rows, &params);
    assert!(beyond.rows.is_empty());
    params.page = clamp_page(params.page, beyond.total_pages);
    let clamped = view(&rows, &params);
    assert_eq!(clamped.page, beyond.total_pages.max(1));

    let total: usize = (1..=clamped.total_pages)
        .map(|page| {
            view(
                &rows,
                &ViewParameters {
                    page,
                    ..params.clone()
                },
            )
            .rows
            .len()
        })
        .sum();
    assert_eq!(total, clamped.total_count);
}

#[test]
fn sort_cycle_round_trip() {
    let state = SortState::default();
    let once = state.cycle(SortField::Status);
    let twice = once.cycle(SortField::Status);
    let thrice = twice.cycle(SortField::Status);
    assert_eq!(thrice, SortState::default());
    assert_eq!(
        twice.cycle(SortField::Date).active(),
        Some((SortField::Date, SortDirection::Asc))
    );
}

#[test]
fn csv_of_the_view_matches_visible_order() {
    let mut rng = StdRng::seed_from_u64(77);
    let rows = generate_table_data(&mut rng, Utc::now());
    let params = ViewParameters {
        search_term: "sale".to_string(),
        sort: SortState {
            field: Some(SortField::Revenue),
            direction: Some(SortDirection::Desc),
        },
        ..ViewParameters::default()
    };
    let visible = filter_and_sort(&rows, &params);
    let csv = render_campaign_view_csv(visible.iter().copied());
    let names: Vec<_> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap_or_default().to_string())
        .collect();
    let expected: Vec<_> = visible.iter().map(|row| format!("\"{}\"", row.campaign)).collect();
    assert_eq!(names, expected);
}

#[test]
fn metric_growth_keeps_currency_format() {
    assert_eq!(update_metric_value("$750,000", 0.05).expect("update"), "$787,500");

    let mut rng = StdRng::seed_from_u64(10);
    let mut metrics = generate_metrics(&mut rng);
    for _ in 0..10 {
        let next = generate_trending_metrics(&mut rng, &metrics).expect("trending");
        for (before, after) in metrics.iter().zip(&next) {
            assert_eq!(after.change_type, ChangeType::Positive);
            assert!(
                parse_metric_value(&after.value).expect("after")
                    >= parse_metric_value(&before.value).expect("before")
            );
        }
        metrics = next;
    }
    assert!(metrics[0].value.starts_with('$'));
    assert!(metrics[3].value.ends_with('%'));
}

#[tokio::test]
async fn dashboard_core_refresh_and_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = DashboardCore::new(dir.path().to_path_buf()).expect("core");

    let initial = core.snapshot().await;
    assert_eq!(initial.metrics.len(), 4);
    assert_eq!(initial.line_chart.len(), 12);
    assert_eq!(initial.table.len(), 48);

    let refreshed = core.refresh().await;
    assert!(refreshed.revision > initial.revision);

    let export = core.export_table().await.expect("export");
    assert!(std::path::Path::new(&export.path).exists());
    assert_eq!(export.mime_type, "text/csv;charset=utf-8;");
}
