use chrono::{Datelike, Local, Months, NaiveDate};
use serde::Serialize;

pub const WEEK_LEN: usize = 7;
pub const GRID_ROWS: usize = 6;
pub const GRID_CELLS: usize = WEEK_LEN * GRID_ROWS;

/// A year and month, independent of any day-of-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self::from_date)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn first_day(&self) -> NaiveDate {
        // year and month always come from a valid NaiveDate
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month, found as "day 0" of the following month.
    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        match first.checked_add_months(Months::new(1)) {
            Some(first_of_next) => (first_of_next - first).num_days() as u32,
            // only December of the last representable year has no successor
            None => 31,
        }
    }

    /// Length of the month before this one, from the day before our first.
    pub fn days_in_previous_month(&self) -> u32 {
        self.first_day().pred_opt().map(|day| day.day()).unwrap_or(31)
    }

    /// Weekday of the first day, 0 = Sunday .. 6 = Saturday.
    pub fn start_weekday(&self) -> usize {
        self.first_day().weekday().num_days_from_sunday() as usize
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn previous(&self) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map(Self::from_date)
            .unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map(Self::from_date)
            .unwrap_or(*self)
    }

    pub fn page(&self, direction: PageDirection) -> Self {
        match direction {
            PageDirection::Previous => self.previous(),
            PageDirection::Next => self.next(),
        }
    }

    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthRelation {
    PreviousMonth,
    CurrentMonth,
    NextMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day_number: u32,
    pub relation: MonthRelation,
    pub is_today: bool,
    pub is_selected: bool,
}

impl DayCell {
    fn adjacent(day_number: u32, relation: MonthRelation) -> Self {
        Self {
            day_number,
            relation,
            is_today: false,
            is_selected: false,
        }
    }

    pub fn is_current_month(&self) -> bool {
        self.relation == MonthRelation::CurrentMonth
    }
}

/// The 6x7 row-major grid for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub month: CalendarMonth,
    pub has_selection: bool,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn rows(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(WEEK_LEN)
    }

    pub fn first_current_index(&self) -> usize {
        self.month.start_weekday()
    }

    pub fn cell(&self, index: usize) -> Option<&DayCell> {
        self.cells.get(index)
    }

    /// The single cell drawn with emphasis: the selected day when a selection
    /// exists, today otherwise.
    pub fn highlighted_index(&self) -> Option<usize> {
        if self.has_selection {
            self.cells.iter().position(|cell| cell.is_selected)
        } else {
            self.cells.iter().position(|cell| cell.is_today)
        }
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        self.highlighted_index() == Some(index)
    }

    /// Concrete date shown by a cell, including the greyed-out neighbours.
    /// Neighbours past the end of the representable range have no date.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        let cell = self.cells.get(index)?;
        let month = match cell.relation {
            MonthRelation::PreviousMonth => self.month.previous(),
            MonthRelation::CurrentMonth => self.month,
            MonthRelation::NextMonth => self.month.next(),
        };
        if cell.relation != MonthRelation::CurrentMonth && month == self.month {
            return None;
        }
        month.date(cell.day_number)
    }
}

pub fn compute_grid(
    reference: NaiveDate,
    selected: Option<NaiveDate>,
    today: NaiveDate,
) -> MonthGrid {
    let month = CalendarMonth::from_date(reference);
    let start_weekday = month.start_weekday();
    let days_in_month = month.days_in_month();
    let days_in_previous_month = month.days_in_previous_month();

    let mut cells = Vec::with_capacity(GRID_CELLS);

    for offset in (0..start_weekday as u32).rev() {
        cells.push(DayCell::adjacent(
            days_in_previous_month - offset,
            MonthRelation::PreviousMonth,
        ));
    }

    let matches = |date: Option<NaiveDate>, day: u32| {
        date.is_some_and(|date| month.contains(date) && date.day() == day)
    };
    for day in 1..=days_in_month {
        cells.push(DayCell {
            day_number: day,
            relation: MonthRelation::CurrentMonth,
            is_today: matches(Some(today), day),
            is_selected: matches(selected, day),
        });
    }

    let mut next_day = 1;
    while cells.len() < GRID_CELLS {
        cells.push(DayCell::adjacent(next_day, MonthRelation::NextMonth));
        next_day += 1;
    }

    MonthGrid {
        month,
        has_selection: selected.is_some(),
        cells,
    }
}

/// Moves a reference date one month back or forward. The result is the first
/// of the target month; only its year and month matter to the grid.
pub fn page_month(reference: NaiveDate, direction: PageDirection) -> NaiveDate {
    CalendarMonth::from_date(reference)
        .page(direction)
        .first_day()
}

/// Date a press on `cell` selects, or `None` when the press does nothing.
pub fn select_date(cell: &DayCell, month: CalendarMonth) -> Option<NaiveDate> {
    if !cell.is_current_month() {
        return None;
    }
    month.date(cell.day_number)
}

/// State owned by the calendar screen for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    pub month: CalendarMonth,
    pub selected: Option<NaiveDate>,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            month: CalendarMonth::from_date(today),
            selected: None,
        }
    }

    pub fn grid(&self, today: NaiveDate) -> MonthGrid {
        compute_grid(self.month.first_day(), self.selected, today)
    }

    pub fn page(&mut self, direction: PageDirection) {
        self.month = self.month.page(direction);
    }

    pub fn jump_to_today(&mut self, today: NaiveDate) {
        self.month = CalendarMonth::from_date(today);
    }

    /// Applies a press on grid cell `index`. Returns true when the selection
    /// changed.
    pub fn press(&mut self, index: usize, today: NaiveDate) -> bool {
        let grid = self.grid(today);
        let Some(date) = grid
            .cell(index)
            .and_then(|cell| select_date(cell, self.month))
        else {
            return false;
        };

        let changed = self.selected != Some(date);
        self.selected = Some(date);
        changed
    }
}
