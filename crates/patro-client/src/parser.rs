use patro_core::error::AppError;
use patro_core::models::CalendarDay;
use patro_core::numerals::native_to_arabic;
use scraper::{ElementRef, Html, Selector};

/// CSS selectors describing where the day cells live on a month page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelectors {
    /// One element per day cell.
    pub day_cell: String,
    /// Day number in native numerals, inside a cell.
    pub native_day: String,
    /// Day of the reference (Gregorian) month, inside a cell.
    pub reference_day: String,
    pub tithi: String,
    pub event: String,
    /// Class on a cell that marks a public holiday.
    pub holiday_class: String,
    /// Class on padding cells belonging to the previous or next month.
    pub filler_class: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            day_cell: "ul.dates li".to_string(),
            native_day: "span.nep".to_string(),
            reference_day: "span.eng".to_string(),
            tithi: "span.tithi".to_string(),
            event: "span.event".to_string(),
            holiday_class: "holiday".to_string(),
            filler_class: "disable".to_string(),
        }
    }
}

/// Extracts [`CalendarDay`] records from the HTML of one month page.
///
/// The parser only extracts; it does not judge the records. Blank or
/// malformed cells come through as-is and are left to the validator.
#[derive(Debug, Clone)]
pub struct CalendarPageParser {
    day_cell: Selector,
    native_day: Selector,
    reference_day: Selector,
    tithi: Selector,
    event: Selector,
    holiday_class: String,
    filler_class: String,
}

impl CalendarPageParser {
    /// Parser using [`PageSelectors::default`].
    pub fn new() -> Result<Self, AppError> {
        Self::with_selectors(&PageSelectors::default())
    }

    pub fn with_selectors(selectors: &PageSelectors) -> Result<Self, AppError> {
        Ok(Self {
            day_cell: compile(&selectors.day_cell)?,
            native_day: compile(&selectors.native_day)?,
            reference_day: compile(&selectors.reference_day)?,
            tithi: compile(&selectors.tithi)?,
            event: compile(&selectors.event)?,
            holiday_class: selectors.holiday_class.clone(),
            filler_class: selectors.filler_class.clone(),
        })
    }

    /// Parse a month page. Fails with a `Parsing` error when the page holds
    /// no day cells at all.
    pub fn parse(&self, html: &str) -> Result<Vec<CalendarDay>, AppError> {
        let document = Html::parse_document(html);

        let days: Vec<CalendarDay> = document
            .select(&self.day_cell)
            .filter(|cell| !has_class(cell, &self.filler_class))
            .filter_map(|cell| self.parse_cell(cell))
            .collect();

        if days.is_empty() {
            return Err(AppError::parsing("No day cells found on page"));
        }
        Ok(days)
    }

    fn parse_cell(&self, cell: ElementRef<'_>) -> Option<CalendarDay> {
        let day = first_text(cell, &self.native_day)?;
        Some(CalendarDay {
            is_holiday: has_class(&cell, &self.holiday_class),
            tithi: first_text(cell, &self.tithi),
            event: first_text(cell, &self.event),
            day_in_en: native_to_arabic(&day),
            day,
            en: first_text(cell, &self.reference_day).unwrap_or_default(),
        })
    }
}

fn compile(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::config(format!("Invalid CSS selector '{selector}': {e}")))
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Whitespace-normalized text of the first match, if non-empty.
fn first_text(cell: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = cell.select(selector).next()?;
    let text = element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <div class="calendar">
          <ul class="dates">
            <li class="disable"><span class="nep">३०</span><span class="eng">13</span></li>
            <li><span class="nep">१</span><span class="tithi">प्रतिपदा</span><span class="eng">14</span></li>
            <li class="holiday">
              <span class="event"> नयाँ   वर्ष </span>
              <span class="nep">२</span>
              <span class="tithi">द्वितीया</span>
              <span class="eng">15</span>
            </li>
            <li><span class="nep">३</span><span class="tithi"></span><span class="eng">16</span></li>
            <li></li>
            <li class="disable"><span class="nep">१</span><span class="eng">1</span></li>
          </ul>
        </div>
        </body></html>
    "#;

    #[test]
    fn parses_day_cells() {
        let parser = CalendarPageParser::new().unwrap();
        let days = parser.parse(PAGE).unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].day, "१");
        assert_eq!(days[0].day_in_en, "1");
        assert_eq!(days[0].en, "14");
        assert_eq!(days[0].tithi.as_deref(), Some("प्रतिपदा"));
        assert!(!days[0].is_holiday);
    }

    #[test]
    fn reads_holiday_and_event() {
        let parser = CalendarPageParser::new().unwrap();
        let days = parser.parse(PAGE).unwrap();

        assert!(days[1].is_holiday);
        assert_eq!(days[1].event.as_deref(), Some("नयाँ वर्ष"));
        assert_eq!(days[1].day_in_en, "2");
    }

    #[test]
    fn blank_optional_fields_are_none() {
        let parser = CalendarPageParser::new().unwrap();
        let days = parser.parse(PAGE).unwrap();

        assert_eq!(days[2].tithi, None);
        assert_eq!(days[2].event, None);
    }

    #[test]
    fn page_without_cells_is_a_parsing_error() {
        let parser = CalendarPageParser::new().unwrap();
        let err = parser.parse("<html><body><p>Service unavailable</p></body></html>").unwrap_err();
        assert_eq!(err.kind(), patro_core::ErrorKind::Parsing);
    }

    #[test]
    fn custom_selectors() {
        let selectors = PageSelectors {
            day_cell: "td.day".to_string(),
            native_day: "b".to_string(),
            reference_day: "i".to_string(),
            ..PageSelectors::default()
        };
        let parser = CalendarPageParser::with_selectors(&selectors).unwrap();
        let days = parser
            .parse("<table><tr><td class='day holiday'><b>५</b><i>18</i></td></tr></table>")
            .unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day_in_en, "5");
        assert_eq!(days[0].en, "18");
        assert!(days[0].is_holiday);
    }

    #[test]
    fn invalid_selector_is_a_config_error() {
        let selectors = PageSelectors {
            day_cell: "ul[".to_string(),
            ..PageSelectors::default()
        };
        let err = CalendarPageParser::with_selectors(&selectors).unwrap_err();
        assert_eq!(err.kind(), patro_core::ErrorKind::Config);
    }
}
