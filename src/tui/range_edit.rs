//! Keyboard-driven editing of the selected date range.
//!
//! Both bounds stay inside the dataset span, and moving one bound past the
//! other drags the other one along, so `range()` is always valid.

use chrono::{Days, Months, NaiveDate};

use crate::domain::DateRange;

/// Which bound the arrow keys move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

#[derive(Debug, Clone)]
pub struct RangeEditor {
    span: DateRange,
    range: DateRange,
    selected: Bound,
}

impl RangeEditor {
    pub fn new(span: DateRange, initial: DateRange) -> Self {
        let mut editor = Self {
            span,
            range: span,
            selected: Bound::Start,
        };
        editor.set_bounds(initial.start(), initial.end());
        editor
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn selected(&self) -> Bound {
        self.selected
    }

    pub fn select(&mut self, bound: Bound) {
        self.selected = bound;
    }

    /// The currently selected bound's date.
    pub fn selected_date(&self) -> NaiveDate {
        match self.selected {
            Bound::Start => self.range.start(),
            Bound::End => self.range.end(),
        }
    }

    pub fn shift_days(&mut self, delta: i64) {
        let current = self.selected_date();
        let moved = if delta >= 0 {
            current.checked_add_days(Days::new(delta.unsigned_abs()))
        } else {
            current.checked_sub_days(Days::new(delta.unsigned_abs()))
        };
        self.set_selected(moved.unwrap_or(current));
    }

    /// Month arithmetic clamps the day (Jan 31 + 1 month = Feb 28/29).
    pub fn shift_months(&mut self, delta: i32) {
        let current = self.selected_date();
        let moved = if delta >= 0 {
            current.checked_add_months(Months::new(delta.unsigned_abs()))
        } else {
            current.checked_sub_months(Months::new(delta.unsigned_abs()))
        };
        self.set_selected(moved.unwrap_or(current));
    }

    /// Move the selected bound to `date` (clamped into the span).
    pub fn set_selected(&mut self, date: NaiveDate) {
        let date = self.span.clamp(date);
        match self.selected {
            Bound::Start => self.set_bounds(date, self.range.end().max(date)),
            Bound::End => self.set_bounds(self.range.start().min(date), date),
        }
    }

    /// Select the whole dataset span again.
    pub fn reset(&mut self) {
        self.range = self.span;
    }

    fn set_bounds(&mut self, start: NaiveDate, end: NaiveDate) {
        let start = self.span.clamp(start);
        let end = self.span.clamp(end).max(start);
        self.range = DateRange::new(start, end).unwrap_or(DateRange::day(start));
    }
}
