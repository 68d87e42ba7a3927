//! Mock data generators.
//!
//! Every generator takes its random source explicitly so callers can seed it.
//! None of them touch shared state.

use crate::errors::AppResult;
use crate::metric_update::{group_thousands, random_growth, update_metric_value};
use crate::models::{CampaignRow, CampaignStatus, ChangeType, ChartPoint, Metric, MetricIcon};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const PLATFORMS: [(&str, u64); 6] = [
    ("Google Ads", 48_293),
    ("Facebook", 35_742),
    ("Instagram", 29_834),
    ("LinkedIn", 18_529),
    ("Twitter", 12_847),
    ("TikTok", 9_235),
];

/// (device, share of traffic in percent, revenue)
pub const DEVICES: [(&str, u64, u64); 3] = [
    ("Desktop", 45, 385_920),
    ("Mobile", 35, 298_473),
    ("Tablet", 20, 169_236),
];

pub const CAMPAIGNS: [&str; 48] = [
    "Summer Sale Campaign",
    "Black Friday Blast",
    "Product Launch",
    "Brand Awareness",
    "Retargeting Campaign",
    "Holiday Special",
    "New Customer Acquisition",
    "Customer Retention",
    "Flash Sale Event",
    "Newsletter Signup",
    "App Install Campaign",
    "Video Ad Campaign",
    "End of Season Sale",
    "Clearance Countdown",
    "Buy One Get One Free",
    "Mega Discount Drive",
    "Weekend Price Drop",
    "Early Bird Deals",
    "Exclusive VIP Offers",
    "Free Shipping Frenzy",
    "Feature Highlight Campaign",
    "Rebranding Launch",
    "Product Upgrade Push",
    "New Collection Reveal",
    "Limited Edition Drop",
    "Beta Access Promotion",
    "Brand Storytelling Series",
    "Cart Abandonment Recovery",
    "Welcome Series for New Users",
    "Win-Back Inactive Users",
    "Loyalty Rewards Program",
    "Upsell/Cross-sell Offer",
    "First-Time Buyer Promo",
    "Referral Program Push",
    "Instagram Engagement Boost",
    "TikTok Influencer Collab",
    "Google Shopping Ads",
    "LinkedIn Lead Generation",
    "YouTube Pre-Roll Campaign",
    "Email Re-Engagement Blast",
    "SMS Flash Deal Alert",
    "Back to School Promo",
    "Valentine\u{2019}s Day Special",
    "Diwali Dhamaka Deals",
    "Christmas Countdown",
    "New Year\u{2019}s Resolution Drive",
    "Summer Essentials Push",
    "Monsoon Madness",
];

const TABLE_DATE_WINDOW_MS: i64 = 30 * 24 * 60 * 60 * 1000;

pub fn generate_metrics<R: Rng + ?Sized>(rng: &mut R) -> Vec<Metric> {
    let revenue = rng.random_range(500_000..=1_000_000i64);
    let users = rng.random_range(100_000..=300_000i64);
    let conversions = rng.random_range(5_000..=20_000i64);
    let growth_rate = rng.random_range(10..=40i64);

    vec![
        metric(rng, "Total Revenue", format!("${}", group_thousands(revenue)), MetricIcon::TrendingUp),
        metric(rng, "Active Users", group_thousands(users), MetricIcon::Users),
        metric(rng, "Conversions", group_thousands(conversions), MetricIcon::Target),
        metric(rng, "Growth Rate", format!("{}%", growth_rate), MetricIcon::BarChart3),
    ]
}

fn metric<R: Rng + ?Sized>(rng: &mut R, title: &str, value: String, icon: MetricIcon) -> Metric {
    let (change, change_type) = random_change(rng);
    Metric {
        title: title.to_string(),
        value,
        change,
        change_type,
        icon,
    }
}

fn random_change<R: Rng + ?Sized>(rng: &mut R) -> (String, ChangeType) {
    let mut percent = (rng.random_range(-10.0..10.0f64) * 10.0).round() / 10.0;
    if percent == 0.0 {
        // -0.0 would otherwise render as "-0.0%" while classifying as positive
        percent = 0.0;
    }
    if percent >= 0.0 {
        (format!("+{:.1}%", percent), ChangeType::Positive)
    } else {
        (format!("{:.1}%", percent), ChangeType::Negative)
    }
}

pub fn generate_line_chart_data<R: Rng + ?Sized>(rng: &mut R) -> Vec<ChartPoint> {
    MONTHS
        .iter()
        .map(|month| ChartPoint {
            name: (*month).to_string(),
            revenue: Some(rng.random_range(30_000..80_000)),
            users: Some(rng.random_range(15_000..35_000)),
            conversions: Some(rng.random_range(800..2_800)),
            value: rng.random_range(30_000..80_000),
        })
        .collect()
}

pub fn generate_bar_chart_data() -> Vec<ChartPoint> {
    PLATFORMS
        .iter()
        .map(|(name, base)| ChartPoint::with_revenue(*name, *base, *base))
        .collect()
}

pub fn generate_donut_chart_data() -> Vec<ChartPoint> {
    DEVICES
        .iter()
        .map(|(name, share, revenue)| ChartPoint::with_revenue(*name, *share, *revenue))
        .collect()
}

pub fn generate_table_data<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<CampaignRow> {
    CAMPAIGNS
        .iter()
        .enumerate()
        .map(|(index, campaign)| {
            let age = Duration::milliseconds(rng.random_range(0..TABLE_DATE_WINDOW_MS));
            CampaignRow {
                id: format!("campaign-{}", index + 1),
                campaign: (*campaign).to_string(),
                impressions: rng.random_range(10_000..110_000),
                clicks: rng.random_range(500..5_500),
                conversions: rng.random_range(50..550),
                revenue: rng.random_range(1_000..11_000),
                ctr: round2(rng.random_range(1.0..6.0)),
                cpc: round2(rng.random_range(0.5..3.5)),
                status: CampaignStatus::ALL[rng.random_range(0..CampaignStatus::ALL.len())],
                date: (now - age).date_naive(),
            }
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Grows every metric value and marks the change as positive. Title and icon carry over.
pub fn generate_trending_metrics<R: Rng + ?Sized>(
    rng: &mut R,
    previous: &[Metric],
) -> AppResult<Vec<Metric>> {
    previous
        .iter()
        .map(|metric| {
            let value = update_metric_value(&metric.value, random_growth(rng))?;
            let change = rng.random_range(2.0..12.0f64);
            Ok(Metric {
                title: metric.title.clone(),
                value,
                change: format!("+{:.1}%", change),
                change_type: ChangeType::Positive,
                icon: metric.icon,
            })
        })
        .collect()
}

pub fn generate_trending_line_chart_data<R: Rng + ?Sized>(rng: &mut R) -> Vec<ChartPoint> {
    let mut revenue: u64 = 30_000;
    let mut users: u64 = 15_000;
    let mut conversions: u64 = 800;

    MONTHS
        .iter()
        .enumerate()
        .map(|(index, month)| {
            let step = index as f64;
            revenue = compound(revenue, 1.0 + step * 0.08 + rng.random_range(0.0..0.15));
            users = compound(users, 1.0 + step * 0.05 + rng.random_range(0.0..0.10));
            conversions = compound(conversions, 1.0 + step * 0.03 + rng.random_range(0.0..0.08));
            ChartPoint {
                name: (*month).to_string(),
                value: revenue,
                revenue: Some(revenue),
                users: Some(users),
                conversions: Some(conversions),
            }
        })
        .collect()
}

fn compound(base: u64, factor: f64) -> u64 {
    (base as f64 * factor).floor() as u64
}

pub fn generate_trending_bar_chart_data<R: Rng + ?Sized>(rng: &mut R) -> Vec<ChartPoint> {
    PLATFORMS
        .iter()
        .map(|(name, base)| {
            let value = compound(*base, 1.0 + rng.random_range(0.10..0.40));
            ChartPoint::with_revenue(*name, value, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric_update::{parse_metric_value, MetricFormat};
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn metrics_have_four_entries_with_consistent_change_sign() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let metrics = generate_metrics(&mut rng);
            assert_eq!(metrics.len(), 4);
            for metric in &metrics {
                let percent = parse_metric_value(&metric.change).expect("change parses");
                match metric.change_type {
                    ChangeType::Positive => {
                        assert!(metric.change.starts_with('+'), "{}", metric.change);
                        assert!(percent >= 0.0);
                    }
                    ChangeType::Negative => assert!(percent < 0.0, "{}", metric.change),
                }
                assert!((-10.0..=10.0).contains(&percent));
            }
        }
    }

    #[test]
    fn metric_magnitudes_respect_ranges_and_formats() {
        let mut rng = StdRng::seed_from_u64(42);
        let metrics = generate_metrics(&mut rng);
        let titles: Vec<_> = metrics.iter().map(|metric| metric.title.as_str()).collect();
        assert_eq!(titles, ["Total Revenue", "Active Users", "Conversions", "Growth Rate"]);

        let revenue = parse_metric_value(&metrics[0].value).expect("revenue");
        assert_eq!(MetricFormat::detect(&metrics[0].value), MetricFormat::Currency);
        assert!((500_000.0..=1_000_000.0).contains(&revenue));

        let conversions = parse_metric_value(&metrics[2].value).expect("conversions");
        assert!((5_000.0..=20_000.0).contains(&conversions));

        assert_eq!(MetricFormat::detect(&metrics[3].value), MetricFormat::Percentage);
        assert_eq!(metrics[1].icon, MetricIcon::Users);
    }

    #[test]
    fn same_seed_reproduces_datasets() {
        let mut first = StdRng::seed_from_u64(7);
        let mut second = StdRng::seed_from_u64(7);
        assert_eq!(generate_metrics(&mut first), generate_metrics(&mut second));
        assert_eq!(
            generate_table_data(&mut first, fixed_now()),
            generate_table_data(&mut second, fixed_now())
        );
    }

    #[test]
    fn line_chart_covers_twelve_months_in_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let points = generate_line_chart_data(&mut rng);
        let names: Vec<_> = points.iter().map(|point| point.name.as_str()).collect();
        assert_eq!(names, MONTHS);
        for point in &points {
            assert!((30_000..80_000).contains(&point.revenue.expect("revenue")));
            assert!((15_000..35_000).contains(&point.users.expect("users")));
            assert!((800..2_800).contains(&point.conversions.expect("conversions")));
        }
    }

    #[test]
    fn bar_chart_lists_six_platforms_in_order() {
        let names: Vec<_> = generate_bar_chart_data().into_iter().map(|point| point.name).collect();
        assert_eq!(
            names,
            ["Google Ads", "Facebook", "Instagram", "LinkedIn", "Twitter", "TikTok"]
        );
    }

    #[test]
    fn donut_chart_keeps_unnormalized_shares() {
        let points = generate_donut_chart_data();
        assert_eq!(points.len(), 3);
        assert_eq!(points.iter().map(|point| point.value).sum::<u64>(), 100);
        assert_eq!(points[1].name, "Mobile");
    }

    #[test]
    fn table_rows_have_unique_positional_ids() {
        let mut rng = StdRng::seed_from_u64(99);
        let rows = generate_table_data(&mut rng, fixed_now());
        assert_eq!(rows.len(), CAMPAIGNS.len());
        let ids: HashSet<_> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids.len(), rows.len());
        assert_eq!(rows[0].id, "campaign-1");
        assert_eq!(rows[47].id, "campaign-48");
    }

    #[test]
    fn table_values_fall_inside_ranges() {
        let mut rng = StdRng::seed_from_u64(5);
        let now = fixed_now();
        let earliest = (now - Duration::days(30)).date_naive();
        for row in generate_table_data(&mut rng, now) {
            assert!((10_000..110_000).contains(&row.impressions));
            assert!((500..5_500).contains(&row.clicks));
            assert!((50..550).contains(&row.conversions));
            assert!((1_000..11_000).contains(&row.revenue));
            assert!((1.0..=6.0).contains(&row.ctr));
            assert!((0.5..=3.5).contains(&row.cpc));
            assert_eq!(row.ctr, round2(row.ctr));
            assert!(row.date >= earliest && row.date <= now.date_naive());
        }
    }

    #[test]
    fn trending_metrics_only_grow_and_stay_positive() {
        let mut rng = StdRng::seed_from_u64(21);
        let base = generate_metrics(&mut rng);
        let trending = generate_trending_metrics(&mut rng, &base).expect("trending");
        assert_eq!(trending.len(), base.len());
        for (before, after) in base.iter().zip(&trending) {
            assert_eq!(after.change_type, ChangeType::Positive);
            assert_eq!(after.title, before.title);
            assert_eq!(after.icon, before.icon);
            assert_eq!(MetricFormat::detect(&after.value), MetricFormat::detect(&before.value));
            let old = parse_metric_value(&before.value).expect("old");
            let new = parse_metric_value(&after.value).expect("new");
            assert!(new >= old, "{} -> {}", before.value, after.value);
            let change = parse_metric_value(&after.change).expect("change");
            assert!((2.0..=12.0).contains(&change));
        }
    }

    #[test]
    fn trending_metrics_surface_malformed_values() {
        let mut rng = StdRng::seed_from_u64(0);
        let broken = vec![Metric {
            title: "Broken".to_string(),
            value: "twelve".to_string(),
            change: "+1.0%".to_string(),
            change_type: ChangeType::Positive,
            icon: MetricIcon::Target,
        }];
        assert!(generate_trending_metrics(&mut rng, &broken).is_err());
    }

    #[test]
    fn trending_line_chart_compounds_upward() {
        let mut rng = StdRng::seed_from_u64(8);
        let points = generate_trending_line_chart_data(&mut rng);
        assert_eq!(points.len(), 12);
        for pair in points.windows(2) {
            assert!(pair[1].value > pair[0].value);
            assert!(pair[1].users > pair[0].users);
            assert!(pair[1].conversions >= pair[0].conversions);
        }
        assert!(points[0].revenue.expect("revenue") >= 30_000);
    }

    #[test]
    fn trending_bar_chart_grows_each_platform() {
        let mut rng = StdRng::seed_from_u64(13);
        for (point, (name, base)) in generate_trending_bar_chart_data(&mut rng).iter().zip(PLATFORMS) {
            assert_eq!(point.name, name);
            assert_eq!(point.revenue, Some(point.value));
            assert!(point.value >= (base as f64 * 1.1).floor() as u64);
            assert!(point.value < (base as f64 * 1.4).ceil() as u64);
        }
    }
}
