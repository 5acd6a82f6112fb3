//! HTTP surface (warp).
//!
//! The holiday table is loaded once before the server starts and shared
//! read-only behind an `Arc`; handlers never mutate it.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::{collections::HashMap, convert::Infallible, sync::Arc};
use tracing::error;
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::calendar::{self, render::render_page, DayCell, MonthPage, Navigation};
use crate::process::load::HolidayTable;

/// Per-process state injected into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub table: Arc<HolidayTable>,
    pub year: i32,
    pub source_path: String,
    /// Fixed "today" for tests; `None` uses the local clock.
    pub today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(table: HolidayTable, year: i32, source_path: impl Into<String>) -> Self {
        AppState {
            table: Arc::new(table),
            year,
            source_path: source_path.into(),
            today: None,
        }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn page_for(&self, query: &HashMap<String, String>) -> crate::Result<MonthPage> {
        let fallback = calendar::default_month(self.year, self.today());
        let month = calendar::select_month(query.get("m").map(String::as_str), fallback);
        calendar::build_page(self.year, month, &self.table, self.source_path.clone())
    }
}

fn internal_error(e: &crate::HolidayError) -> warp::reply::WithStatus<warp::reply::Html<String>> {
    error!(error = %e, "building calendar page");
    warp::reply::with_status(
        warp::reply::html(String::from("internal error")),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    holidays: usize,
    year: i32,
}

#[derive(Serialize)]
struct CellView<'a> {
    date: NaiveDate,
    day: u32,
    weekday: u32,
    holiday: Option<&'a str>,
}

#[derive(Serialize)]
struct MonthView<'a> {
    year: i32,
    month: u32,
    weeks: Vec<Vec<Option<CellView<'a>>>>,
    navigation: Navigation,
    source_path: &'a str,
}

impl<'a> From<&'a MonthPage> for MonthView<'a> {
    fn from(page: &'a MonthPage) -> Self {
        let weeks = page
            .grid
            .weeks
            .iter()
            .map(|w| {
                w.cells()
                    .iter()
                    .map(|c| match c {
                        DayCell::Padding => None,
                        DayCell::Date(d) => Some(CellView {
                            date: d.date(),
                            day: d.day(),
                            weekday: d.weekday(),
                            holiday: d.holiday(),
                        }),
                    })
                    .collect()
            })
            .collect();
        MonthView {
            year: page.grid.year,
            month: page.grid.month,
            weeks,
            navigation: Navigation::for_month(page.grid.month),
            source_path: &page.source_path,
        }
    }
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn calendar_page(
    query: HashMap<String, String>,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    match state.page_for(&query).and_then(|page| render_page(&page)) {
        Ok(html) => Ok(warp::reply::with_status(warp::reply::html(html), StatusCode::OK)),
        Err(e) => Ok(internal_error(&e)),
    }
}

async fn month_json(
    query: HashMap<String, String>,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    match state.page_for(&query) {
        Ok(page) => Ok(warp::reply::json(&MonthView::from(&page)).into_response()),
        Err(e) => Ok(internal_error(&e).into_response()),
    }
}

async fn health_check(state: AppState) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::with_status(
        warp::reply::json(&HealthResponse {
            status: "healthy",
            holidays: state.table.len(),
            year: state.year,
        }),
        StatusCode::OK,
    ))
}

/// All routes: `/`, `/api/month` and `/health`.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let page = warp::path::end()
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(calendar_page);

    let api = warp::path!("api" / "month")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(month_json);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(health_check);

    page.or(api).or(health).with(warp::trace::request())
}
