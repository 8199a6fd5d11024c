//! Filtering, sorting and pagination over in-memory collections.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use shared::{
    PaginatedResult, PaginationOptions, SavedRoom, SearchFilters, SortDirection, SortField,
    SortOptions, Visit,
};

/// A record that can be searched with [`SearchFilters`] and ordered by [`SortField`]
pub trait Searchable {
    fn matches(&self, filters: &SearchFilters) -> bool;
    fn compare_by(&self, other: &Self, field: SortField) -> Ordering;
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn optional_substring(value: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |f| contains_ignore_case(value, f))
}

fn within_dates(date: DateTime<Utc>, filters: &SearchFilters) -> bool {
    filters.date_from.map_or(true, |from| date >= from)
        && filters.date_to.map_or(true, |to| date <= to)
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl Searchable for Visit {
    fn matches(&self, filters: &SearchFilters) -> bool {
        if let Some(text) = filters.search_text.as_deref() {
            let in_review = self
                .review
                .as_ref()
                .is_some_and(|r| contains_ignore_case(&r.comment, text));
            if !(contains_ignore_case(&self.store_name, text)
                || contains_ignore_case(&self.theme_name, text)
                || in_review)
            {
                return false;
            }
        }

        if let Some(rating) = filters.rating {
            if self.review.as_ref().map(|r| r.rating) != Some(rating) {
                return false;
            }
        }

        if let Some(cleared) = filters.cleared {
            if self.cleared != cleared {
                return false;
            }
        }

        optional_substring(&self.store_name, filters.store_name.as_deref())
            && optional_substring(&self.theme_name, filters.theme_name.as_deref())
            && within_dates(self.visit_date, filters)
    }

    fn compare_by(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::Date => self.visit_date.cmp(&other.visit_date),
            SortField::Rating => {
                let rating = |v: &Visit| v.review.as_ref().map_or(0, |r| r.rating);
                rating(self).cmp(&rating(other))
            }
            SortField::StoreName => compare_text(&self.store_name, &other.store_name),
            SortField::ThemeName => compare_text(&self.theme_name, &other.theme_name),
        }
    }
}

impl Searchable for SavedRoom {
    fn matches(&self, filters: &SearchFilters) -> bool {
        if let Some(text) = filters.search_text.as_deref() {
            if !(contains_ignore_case(&self.store_name, text)
                || contains_ignore_case(&self.theme_name, text)
                || contains_ignore_case(&self.memo, text))
            {
                return false;
            }
        }

        if let Some(priority) = filters.priority {
            if self.priority != priority {
                return false;
            }
        }

        optional_substring(&self.store_name, filters.store_name.as_deref())
            && optional_substring(&self.theme_name, filters.theme_name.as_deref())
            && within_dates(self.created_at, filters)
    }

    fn compare_by(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::Date => self.created_at.cmp(&other.created_at),
            SortField::Rating => Ordering::Equal,
            SortField::StoreName => compare_text(&self.store_name, &other.store_name),
            SortField::ThemeName => compare_text(&self.theme_name, &other.theme_name),
        }
    }
}

pub fn filter<T: Searchable>(items: Vec<T>, filters: &SearchFilters) -> Vec<T> {
    items.into_iter().filter(|item| item.matches(filters)).collect()
}

/// Stable sort in place
pub fn sort<T: Searchable>(items: &mut [T], options: SortOptions) {
    items.sort_by(|a, b| {
        let ordering = a.compare_by(b, options.field);
        match options.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Slice out one page. Without options the whole collection is a single page.
pub fn paginate<T>(items: Vec<T>, options: Option<PaginationOptions>) -> PaginatedResult<T> {
    let total_count = items.len();

    let Some(options) = options else {
        return PaginatedResult {
            items,
            total_count,
            current_page: 1,
            total_pages: if total_count == 0 { 0 } else { 1 },
            has_next_page: false,
            has_previous_page: false,
        };
    };

    let page = options.page.max(1);
    let limit = options.limit.max(1);
    let total_pages = total_count.div_ceil(limit as usize) as u32;
    let start = (page as usize - 1).saturating_mul(limit as usize);

    let items = items
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    PaginatedResult {
        items,
        total_count,
        current_page: page,
        total_pages,
        has_next_page: page < total_pages,
        has_previous_page: page > 1,
    }
}

/// Filter, then sort, then paginate
pub fn search<T: Searchable>(
    items: Vec<T>,
    filters: &SearchFilters,
    sort_options: Option<SortOptions>,
    pagination: Option<PaginationOptions>,
) -> PaginatedResult<T> {
    let mut matched = filter(items, filters);
    if let Some(options) = sort_options {
        sort(&mut matched, options);
    }
    paginate(matched, pagination)
}
