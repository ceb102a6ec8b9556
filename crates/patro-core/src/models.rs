use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::numerals::is_meaningful;

/// One day cell of a calendar month page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub is_holiday: bool,
    /// Lunar-day designation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tithi: Option<String>,
    /// Festival or event text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Day number in native numerals (e.g. `"१५"`).
    pub day: String,
    /// Same day number in Arabic numerals (e.g. `"15"`).
    pub day_in_en: String,
    /// Matching day of the Gregorian month.
    pub en: String,
}

impl CalendarDay {
    /// Copy of this day with `tithi`/`event` dropped unless they carry a
    /// meaningful value.
    pub fn simplified(&self) -> Self {
        Self {
            tithi: self.tithi.clone().filter(|t| is_meaningful(Some(t.as_str()))),
            event: self.event.clone().filter(|e| is_meaningful(Some(e.as_str()))),
            ..self.clone()
        }
    }
}

/// A single month: its number and ordered day cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    pub fn new(month: u32, days: Vec<CalendarDay>) -> Self {
        Self { month, days }
    }

    pub fn holidays(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days.iter().filter(|d| d.is_holiday)
    }
}

/// Months of one year, in acquisition order.
pub type CalendarYear = Vec<CalendarMonth>;

/// The full dataset: year → months.
///
/// Years serialize as JSON object keys (text) and deserialize back to
/// integers. Iteration and export order is ascending by year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarData {
    years: BTreeMap<i32, CalendarYear>,
}

impl CalendarData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the months for `year`.
    pub fn insert(&mut self, year: i32, months: CalendarYear) -> Option<CalendarYear> {
        self.years.insert(year, months)
    }

    pub fn get(&self, year: i32) -> Option<&CalendarYear> {
        self.years.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &CalendarYear)> {
        self.years.iter().map(|(y, m)| (*y, m))
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Total number of day records across every year and month.
    pub fn day_count(&self) -> usize {
        self.years
            .values()
            .flat_map(|months| months.iter())
            .map(|m| m.days.len())
            .sum()
    }

    /// Copy of the dataset with every day passed through
    /// [`CalendarDay::simplified`].
    pub fn simplified(&self) -> Self {
        let years = self
            .years
            .iter()
            .map(|(year, months)| {
                let months = months
                    .iter()
                    .map(|m| CalendarMonth {
                        month: m.month,
                        days: m.days.iter().map(CalendarDay::simplified).collect(),
                    })
                    .collect();
                (*year, months)
            })
            .collect();
        Self { years }
    }
}

impl IntoIterator for CalendarData {
    type Item = (i32, CalendarYear);
    type IntoIter = std::collections::btree_map::IntoIter<i32, CalendarYear>;

    fn into_iter(self) -> Self::IntoIter {
        self.years.into_iter()
    }
}

impl FromIterator<(i32, CalendarYear)> for CalendarData {
    fn from_iter<I: IntoIterator<Item = (i32, CalendarYear)>>(iter: I) -> Self {
        Self {
            years: iter.into_iter().collect(),
        }
    }
}
