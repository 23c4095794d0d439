use chrono::{Duration, NaiveDate, TimeZone, Utc};
use taskflow::deadline::{relative_age, DeadlineStatus};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_deadline_classification() {
    let today = day(2026, 10, 18);

    assert_eq!(DeadlineStatus::classify(None, today), DeadlineStatus::Unset);
    assert_eq!(DeadlineStatus::classify(Some(day(2026, 10, 15)), today), DeadlineStatus::Overdue(3));
    assert_eq!(DeadlineStatus::classify(Some(today), today), DeadlineStatus::Today);
    assert_eq!(DeadlineStatus::classify(Some(day(2026, 10, 19)), today), DeadlineStatus::Tomorrow);
    assert_eq!(DeadlineStatus::classify(Some(day(2026, 10, 20)), today), DeadlineStatus::Upcoming(2));
    assert_eq!(DeadlineStatus::classify(Some(day(2026, 10, 25)), today), DeadlineStatus::Upcoming(7));
    assert_eq!(
        DeadlineStatus::classify(Some(day(2026, 10, 26)), today),
        DeadlineStatus::Future(day(2026, 10, 26))
    );
}

#[test]
fn test_deadline_labels() {
    assert_eq!(DeadlineStatus::Unset.label(), "");
    assert_eq!(DeadlineStatus::Overdue(3).label(), "3d overdue");
    assert_eq!(DeadlineStatus::Today.label(), "Due today");
    assert_eq!(DeadlineStatus::Tomorrow.label(), "Due tomorrow");
    assert_eq!(DeadlineStatus::Upcoming(5).label(), "Due in 5d");
    assert_eq!(DeadlineStatus::Future(day(2026, 12, 3)).label(), "Dec 3");

    assert!(DeadlineStatus::Overdue(1).is_pressing());
    assert!(DeadlineStatus::Today.is_pressing());
    assert!(!DeadlineStatus::Tomorrow.is_pressing());
}

#[test]
fn test_relative_age() {
    let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

    assert_eq!(relative_age(now - Duration::seconds(30), now), "Just now");
    assert_eq!(relative_age(now - Duration::minutes(5), now), "5m ago");
    assert_eq!(relative_age(now - Duration::hours(3), now), "3h ago");
    assert_eq!(relative_age(now - Duration::days(2), now), "2d ago");
    assert_eq!(relative_age(now - Duration::days(30), now), "Sep 18");
}
