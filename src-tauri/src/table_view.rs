use crate::models::{CampaignRow, SortDirection, SortField, SortState, TableView, ViewParameters};
use std::cmp::Ordering;

const MAX_PAGE_BUTTONS: usize = 5;

impl SortState {
    pub fn active(&self) -> Option<(SortField, SortDirection)> {
        match (self.field, self.direction) {
            (Some(field), Some(direction)) => Some((field, direction)),
            _ => None,
        }
    }

    /// Header click: the same column goes unset -> asc -> desc -> unset, another column starts at asc.
    pub fn cycle(self, field: SortField) -> Self {
        let direction = if self.field == Some(field) {
            match self.direction {
                None => Some(SortDirection::Asc),
                Some(SortDirection::Asc) => Some(SortDirection::Desc),
                Some(SortDirection::Desc) => None,
            }
        } else {
            Some(SortDirection::Asc)
        };

        match direction {
            Some(direction) => Self {
                field: Some(field),
                direction: Some(direction),
            },
            None => Self::default(),
        }
    }
}

impl SortField {
    pub fn is_text(self) -> bool {
        matches!(self, Self::Id | Self::Campaign | Self::Status | Self::Date)
    }
}

/// Filtered and sorted rows, unpaginated. Dataset order is kept when no sort is active.
pub fn filter_and_sort<'a>(rows: &'a [CampaignRow], params: &ViewParameters) -> Vec<&'a CampaignRow> {
    let needle = params.search_term.to_lowercase();
    let mut filtered = rows
        .iter()
        .filter(|row| row.campaign.to_lowercase().contains(&needle))
        .filter(|row| params.status_filter.matches(row.status))
        .collect::<Vec<_>>();

    if let Some((field, direction)) = params.sort.active() {
        filtered.sort_by(|left, right| {
            let ordering = compare_rows(field, left, right);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    filtered
}

/// Out-of-range pages, page 0 included, come back empty. Clamping is up to the caller.
pub fn view(rows: &[CampaignRow], params: &ViewParameters) -> TableView {
    let filtered = filter_and_sort(rows, params);
    let page_size = params.page_size.get();
    let total_count = filtered.len();
    let total_pages = total_count.div_ceil(page_size);

    let rows = page_bounds(params.page, page_size, total_count)
        .map(|(start, end)| filtered[start..end].iter().map(|row| (*row).clone()).collect())
        .unwrap_or_default();

    TableView {
        rows,
        total_count,
        total_pages,
        page: params.page,
        page_size,
    }
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

fn page_bounds(page: usize, page_size: usize, total: usize) -> Option<(usize, usize)> {
    let start = page.checked_sub(1)?.checked_mul(page_size)?;
    if start >= total {
        return None;
    }
    Some((start, start.saturating_add(page_size).min(total)))
}

fn compare_rows(field: SortField, left: &CampaignRow, right: &CampaignRow) -> Ordering {
    match field {
        SortField::Id => collate(&left.id, &right.id),
        SortField::Campaign => collate(&left.campaign, &right.campaign),
        SortField::Status => collate(left.status.as_str(), right.status.as_str()),
        SortField::Date => left.date.cmp(&right.date),
        SortField::Impressions => left.impressions.cmp(&right.impressions),
        SortField::Clicks => left.clicks.cmp(&right.clicks),
        SortField::Conversions => left.conversions.cmp(&right.conversions),
        SortField::Revenue => left.revenue.cmp(&right.revenue),
        SortField::Ctr => left.ctr.total_cmp(&right.ctr),
        SortField::Cpc => left.cpc.total_cmp(&right.cpc),
    }
}

// Case-insensitive first so "brand" and "Brand" sit together; exact bytes only break ties.
fn collate(left: &str, right: &str) -> Ordering {
    collation_key(left)
        .cmp(&collation_key(right))
        .then_with(|| left.cmp(right))
}

/// Whitespace, then punctuation and symbols, then digits, then letters, the way locale collation
/// orders them. A typographic apostrophe sorts before any letter instead of after by code point.
fn collation_key(value: &str) -> Vec<(u8, char)> {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| {
            let class = if ch.is_whitespace() {
                0
            } else if ch.is_numeric() {
                2
            } else if ch.is_alphabetic() {
                3
            } else {
                1
            };
            (class, ch)
        })
        .collect()
}

impl TableView {
    /// 1-based index of the first visible row, 0 when the page is empty.
    pub fn range_start(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    pub fn range_end(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + self.rows.len()
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn page_numbers(&self) -> Vec<usize> {
        (1..=self.total_pages.min(MAX_PAGE_BUTTONS)).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} results",
            self.range_start(),
            self.range_end(),
            self.total_count
        )
    }
}
