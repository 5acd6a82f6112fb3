//! Month grid construction.
//!
//! Pure and deterministic: the same `(year, month, table)` always yields the
//! same grid. Every structure here is built per request and owned by it.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{HolidayError, Result};
use crate::process::load::HolidayTable;

pub mod render;

pub const DAYS_PER_WEEK: usize = 7;

/// A cell carrying a real date. Day and weekday are always derived from
/// `date` so they cannot disagree with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCell {
    date: NaiveDate,
    holiday: Option<String>,
}

impl DateCell {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// 0 = Sunday .. 6 = Saturday
    pub fn weekday(&self) -> u32 {
        self.date.weekday().num_days_from_sunday()
    }

    pub fn holiday(&self) -> Option<&str> {
        self.holiday.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayCell {
    Padding,
    Date(DateCell),
}

impl DayCell {
    pub fn as_date(&self) -> Option<&DateCell> {
        match self {
            DayCell::Padding => None,
            DayCell::Date(cell) => Some(cell),
        }
    }
}

/// Sunday-first week; the array type pins it to exactly seven cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRow(pub [DayCell; DAYS_PER_WEEK]);

impl WeekRow {
    pub fn cells(&self) -> &[DayCell] {
        &self.0
    }

    /// Pads a short week with trailing padding cells.
    fn from_partial(cells: Vec<DayCell>) -> Self {
        let mut cells = cells.into_iter();
        WeekRow(std::array::from_fn(|_| cells.next().unwrap_or(DayCell::Padding)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<WeekRow>,
}

impl MonthGrid {
    pub fn date_cells(&self) -> impl Iterator<Item = &DateCell> {
        self.weeks
            .iter()
            .flat_map(|w| w.cells())
            .filter_map(DayCell::as_date)
    }
}

/// Which neighbouring months can be navigated to. Navigation never crosses
/// the year boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

impl Navigation {
    pub fn for_month(month: u32) -> Self {
        Navigation {
            prev: (month > 1).then(|| month - 1),
            next: (month < 12).then(|| month + 1),
        }
    }
}

/// Everything the renderer needs for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthPage {
    pub grid: MonthGrid,
    pub prev_month_link: Option<String>,
    pub next_month_link: Option<String>,
    pub source_path: String,
}

pub fn month_link(month: u32) -> String {
    format!("/?m={}", month)
}

pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(HolidayError::InvalidMonth { year, month })
}

/// First day of the following month minus one day.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    first_of_month(year, month)?;
    let (ny, nm) = if month == 12 {
        (year.checked_add(1).ok_or(HolidayError::InvalidMonth { year, month })?, 1)
    } else {
        (year, month + 1)
    };
    first_of_month(ny, nm)?
        .pred_opt()
        .map(|d| d.day())
        .ok_or(HolidayError::InvalidMonth { year, month })
}

/// Lay out one month as Sunday-first week rows annotated from `table`.
pub fn build(year: i32, month: u32, table: &HolidayTable) -> Result<MonthGrid> {
    let first = first_of_month(year, month)?;
    let start_w = first.weekday().num_days_from_sunday() as usize;
    let days = days_in_month(year, month)?;

    let mut weeks = Vec::with_capacity(6);
    let mut week: Vec<DayCell> = vec![DayCell::Padding; start_w];

    for date in first.iter_days().take(days as usize) {
        week.push(DayCell::Date(DateCell {
            date,
            holiday: table.lookup_date(date).map(str::to_string),
        }));
        if week.len() == DAYS_PER_WEEK {
            weeks.push(WeekRow::from_partial(std::mem::take(&mut week)));
        }
    }
    if !week.is_empty() {
        weeks.push(WeekRow::from_partial(week));
    }

    Ok(MonthGrid { year, month, weeks })
}

/// Build the grid plus navigation links and the artifact path for display.
pub fn build_page(
    year: i32,
    month: u32,
    table: &HolidayTable,
    source_path: impl Into<String>,
) -> Result<MonthPage> {
    let grid = build(year, month, table)?;
    let nav = Navigation::for_month(month);
    Ok(MonthPage {
        grid,
        prev_month_link: nav.prev.map(month_link),
        next_month_link: nav.next.map(month_link),
        source_path: source_path.into(),
    })
}

/// Current month when `today` falls in `year`, otherwise January.
pub fn default_month(year: i32, today: NaiveDate) -> u32 {
    if today.year() == year {
        today.month()
    } else {
        1
    }
}

/// Parse the `m` request parameter; anything outside 1..=12 falls back.
pub fn select_month(raw: Option<&str>, fallback: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or(fallback)
}
