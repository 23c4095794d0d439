use chrono::{DateTime, NaiveDate, Utc};

/// How close a task's deadline is, relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    /// No deadline set.
    Unset,
    /// Past due by the given number of days.
    Overdue(i64),
    Today,
    Tomorrow,
    /// Due in 2 to 7 days.
    Upcoming(i64),
    /// Due more than a week out.
    Future(NaiveDate),
}

impl DeadlineStatus {
    /// Classifies `deadline` against `today`.
    ///
    /// # Returns
    /// - `Overdue(n)` when the deadline is `n` days in the past.
    /// - `Today` / `Tomorrow` for 0 and 1 days left.
    /// - `Upcoming(n)` for up to a week.
    /// - `Future(date)` beyond that.
    pub fn classify(deadline: Option<NaiveDate>, today: NaiveDate) -> DeadlineStatus {
        let Some(date) = deadline else {
            return DeadlineStatus::Unset;
        };
        let days_left = (date - today).num_days();
        match days_left {
            d if d < 0 => DeadlineStatus::Overdue(d.abs()),
            0 => DeadlineStatus::Today,
            1 => DeadlineStatus::Tomorrow,
            d if d <= 7 => DeadlineStatus::Upcoming(d),
            _ => DeadlineStatus::Future(date),
        }
    }

    pub fn label(&self) -> String {
        match self {
            DeadlineStatus::Unset => String::new(),
            DeadlineStatus::Overdue(days) => format!("{}d overdue", days),
            DeadlineStatus::Today => "Due today".to_string(),
            DeadlineStatus::Tomorrow => "Due tomorrow".to_string(),
            DeadlineStatus::Upcoming(days) => format!("Due in {}d", days),
            DeadlineStatus::Future(date) => date.format("%b %-d").to_string(),
        }
    }

    /// Overdue or due today.
    pub fn is_pressing(&self) -> bool {
        matches!(self, DeadlineStatus::Overdue(_) | DeadlineStatus::Today)
    }
}

/// Human-friendly age of a timestamp, e.g. "5m ago" or "Mar 3".
pub fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - created_at;
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        created_at.format("%b %-d").to_string()
    }
}
