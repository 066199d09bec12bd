use chrono::NaiveDate;

use family_types::models::{Event, User};
use family_types::validation::normalize_date;

pub const NO_EVENTS: &str = "No events yet. Add one!";
pub const NO_MATCHES: &str = "No events found matching your search.";

/// Search box plus date picker.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Case-insensitive substring of the title or location.
    pub search: String,
    /// `YYYY-MM-DD`; compared against the date part of the event.
    pub date: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = event.title.to_lowercase().contains(&needle)
            || event.location.to_lowercase().contains(&needle);

        let matches_date = match self.date.as_deref() {
            Some(day) if !day.is_empty() => {
                let day = normalize_date(day).unwrap_or_else(|_| day.to_string());
                event.date.split('T').next() == Some(day.as_str())
            }
            _ => true,
        };

        matches_search && matches_date
    }

    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|event| self.matches(event)).collect()
    }
}

/// `Mon Dec 15 2025`, or the raw value if it is not a calendar date.
fn display_date(raw: &str) -> String {
    let day = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(|d| d.format("%a %b %d %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn render_event(event: &Event) -> String {
    let mut lines = vec![
        format!("{}  [{}]", event.title, event.id),
        format!("  {}", display_date(&event.date)),
        format!("  {} - {}", event.start_time, event.end_time),
        format!("  {}", event.location),
    ];
    if !event.required_items.is_empty() {
        lines.push(format!("  Bring: {}", event.required_items));
    }
    lines.join("\n") + "\n"
}

/// The family dashboard, filtered, with the matching empty-state message.
pub fn render_events(events: &[Event], filter: &EventFilter) -> String {
    if events.is_empty() {
        return format!("{NO_EVENTS}\n");
    }

    let shown = filter.apply(events);
    if shown.is_empty() {
        return format!("{NO_MATCHES}\n");
    }

    shown
        .into_iter()
        .map(render_event)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_users(users: &[User]) -> String {
    users
        .iter()
        .map(|u| format!("{} ({}, {})\n", u.username, u.family_id, u.role))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str, date: &str, location: &str) -> Event {
        Event {
            id: title.to_lowercase(),
            title: title.into(),
            date: date.into(),
            start_time: "10:00".into(),
            end_time: "11:00".into(),
            location: location.into(),
            required_items: String::new(),
            username: "alice".into(),
            family_id: "fam1".into(),
        }
    }

    fn events() -> Vec<Event> {
        vec![
            event("Swimming Lesson", "2025-12-15", "Community Pool"),
            event("Grocery Shopping", "2025-12-16", "Supermarket"),
            event("Family Dinner", "2025-12-17T00:00:00.000Z", "Home"),
        ]
    }

    #[test]
    fn search_matches_title_or_location_ignoring_case() {
        let all = events();
        let filter = EventFilter {
            search: "POOL".into(),
            date: None,
        };
        assert_eq!(filter.apply(&all).len(), 1);

        let filter = EventFilter {
            search: "shop".into(),
            date: None,
        };
        assert_eq!(filter.apply(&all)[0].title, "Grocery Shopping");

        assert_eq!(EventFilter::default().apply(&all).len(), 3);
    }

    #[test]
    fn date_filter_compares_the_day_part() {
        let all = events();
        let filter = EventFilter {
            search: String::new(),
            date: Some("2025-12-17".into()),
        };
        let shown = filter.apply(&all);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Family Dinner");
    }

    #[test]
    fn search_and_date_must_both_match() {
        let all = events();
        let filter = EventFilter {
            search: "dinner".into(),
            date: Some("2025-12-15".into()),
        };
        assert!(filter.apply(&all).is_empty());
    }

    #[test]
    fn empty_states_are_distinct() {
        assert_eq!(render_events(&[], &EventFilter::default()), format!("{NO_EVENTS}\n"));

        let filter = EventFilter {
            search: "zoo".into(),
            date: None,
        };
        assert_eq!(render_events(&events(), &filter), format!("{NO_MATCHES}\n"));
    }

    #[test]
    fn rendered_event_shows_readable_date_and_times() {
        let out = render_event(&events()[0]);
        assert!(out.contains("Mon Dec 15 2025"));
        assert!(out.contains("10:00 - 11:00"));
        assert!(!out.contains("Bring:"));
        assert!(out.ends_with("Community Pool\n"));
    }

    #[test]
    fn unpadded_date_filter_still_matches() {
        let filter = EventFilter {
            search: String::new(),
            date: Some("2025-12-7".into()),
        };
        assert!(filter.apply(&events()).is_empty());

        let all = vec![event("Dentist", "2026-01-05", "Clinic")];
        let filter = EventFilter {
            search: String::new(),
            date: Some("2026-1-5".into()),
        };
        assert_eq!(filter.apply(&all).len(), 1);
    }
}
