use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Modal date picker state: a month grid with an arrow-driven selection.
/// Confirming inserts the date as `dd/mm/yyyy` at the cursor.
pub struct CalendarPicker {
    selected: NaiveDate,
}

impl CalendarPicker {
    pub fn new() -> Self {
        Self {
            selected: Local::now().date_naive(),
        }
    }

    pub fn with_date(date: NaiveDate) -> Self {
        Self { selected: date }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    /// Arrow navigation: left/right move a day, up/down a week. Month and
    /// year roll over naturally.
    pub fn move_selection(&mut self, days: i64) {
        if let Some(date) = self.selected.checked_add_signed(Duration::days(days)) {
            self.selected = date;
        }
    }

    /// The text confirming the picker inserts.
    pub fn formatted(&self) -> String {
        self.selected.format("%d/%m/%Y").to_string()
    }

    pub fn title(&self) -> String {
        self.selected.format("%B %Y").to_string()
    }

    /// Panel rendering: month title, weekday header, then the day grid with
    /// the selected day bracketed.
    pub fn panel_text(&self) -> String {
        let mut out = format!(
            "{}  (arrows move, Enter inserts, Esc cancels)\n",
            self.title()
        );
        out.push_str(" Mo  Tu  We  Th  Fr  Sa  Su\n");
        for row in self.month_grid() {
            for cell in row {
                match cell {
                    Some(day) if day == self.selected => {
                        out.push_str(&format!("[{:>2}]", day.day()));
                    }
                    Some(day) => out.push_str(&format!(" {:>2} ", day.day())),
                    None => out.push_str("    "),
                }
            }
            out.push('\n');
        }
        out.pop();
        out
    }

    /// The selected date's month as rows of week cells, Monday first.
    /// Cells outside the month are None.
    pub fn month_grid(&self) -> Vec<[Option<NaiveDate>; 7]> {
        let year = self.selected.year();
        let month = self.selected.month();
        let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start");

        let mut rows = Vec::new();
        let mut row = [None; 7];
        for day in first.iter_days().take_while(|d| d.month() == month) {
            let col = day.weekday().num_days_from_monday() as usize;
            row[col] = Some(day);
            if day.weekday() == Weekday::Sun {
                rows.push(row);
                row = [None; 7];
            }
        }
        if row.iter().any(Option::is_some) {
            rows.push(row);
        }
        rows
    }
}

impl Default for CalendarPicker {
    fn default() -> Self {
        Self::new()
    }
}
