use patro_core::{CalendarData, CalendarDay, CalendarMonth};

const DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];

fn native(n: u32) -> String {
    n.to_string()
        .chars()
        .map(|c| c.to_digit(10).map_or(c, |d| DIGITS[d as usize]))
        .collect()
}

fn month(number: u32, len: u32) -> CalendarMonth {
    let days = (1..=len)
        .map(|n| CalendarDay {
            is_holiday: n % 7 == 0,
            tithi: Some(if n % 5 == 0 { "--" } else { "नवमी" }.to_string()),
            event: (n == 15).then(|| "बुद्ध जयन्ती".to_string()),
            day: native(n),
            day_in_en: n.to_string(),
            en: ((n + 15) % 31 + 1).to_string(),
        })
        .collect();
    CalendarMonth::new(number, days)
}

/// Two complete years with realistic month lengths.
pub fn two_years() -> CalendarData {
    const LENGTHS: [u32; 12] = [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30];
    [2080, 2081]
        .into_iter()
        .map(|year| {
            let months = (1..=12).zip(LENGTHS).map(|(m, len)| month(m, len)).collect();
            (year, months)
        })
        .collect()
}
