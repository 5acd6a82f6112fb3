use askama::Template;

use super::{DateCell, MonthPage};
use crate::error::Result;

/// Month page; labels and paths are HTML-escaped by askama.
#[derive(Template, Debug)]
#[template(path = "calendar.html")]
pub struct CalendarTemplate<'a> {
    pub page: &'a MonthPage,
}

impl CalendarTemplate<'_> {
    fn weekday_class(&self, cell: &DateCell) -> Option<&'static str> {
        match cell.weekday() {
            0 => Some("sunday"),
            6 => Some("saturday"),
            _ => None,
        }
    }
}

/// Render a month page as a standalone HTML document.
pub fn render_page(page: &MonthPage) -> Result<String> {
    Ok(CalendarTemplate { page }.render()?)
}
