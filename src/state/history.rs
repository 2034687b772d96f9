/// Status history projection
///
/// Turns a property's raw status-change records into render-ready rows:
/// newest first, with badge kind, formatted timestamp and note already
/// decided so the view does no logic of its own.

use chrono::{DateTime, FixedOffset, Local, Utc};

use super::data::{PropertyStatus, StatusChangeEntry};

/// Timestamp pattern shown next to each entry (dd/MM/yyyy 'at' HH:mm)
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y at %H:%M";

/// Visual style of a status badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeKind {
    Success,
    Warning,
    Primary,
    /// Neutral outline carrying the raw status text
    Outline(String),
}

impl BadgeKind {
    pub fn for_status(status: &PropertyStatus) -> Self {
        match status {
            PropertyStatus::Available => BadgeKind::Success,
            PropertyStatus::Negotiating => BadgeKind::Warning,
            PropertyStatus::Sold => BadgeKind::Primary,
            PropertyStatus::Other(raw) => BadgeKind::Outline(raw.clone()),
        }
    }

    /// Text shown inside the badge
    pub fn label(&self) -> &str {
        match self {
            BadgeKind::Success => "Available",
            BadgeKind::Warning => "Negotiating",
            BadgeKind::Primary => "Sold",
            BadgeKind::Outline(raw) => raw,
        }
    }
}

/// One history row, ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub badge: BadgeKind,
    pub changed_by: String,
    pub changed_at: String,
    /// `None` when the note was absent or blank
    pub note: Option<String>,
}

/// Result of projecting a history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryProjection {
    pub entries: Vec<DisplayEntry>,
    /// Explicit so callers never confuse "no history" with "not loaded yet"
    pub is_empty: bool,
}

/// Zone the projector renders timestamps in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    /// The machine's zone, looked up per timestamp so DST rules apply
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    fn format(&self, at: &DateTime<Utc>) -> String {
        match self {
            DisplayZone::Local => at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
            DisplayZone::Fixed(offset) => {
                at.with_timezone(offset).format(TIMESTAMP_FORMAT).to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatusHistoryProjector {
    zone: DisplayZone,
}

impl StatusHistoryProjector {
    pub fn new(zone: DisplayZone) -> Self {
        Self { zone }
    }

    /// Format timestamps in the machine's local zone
    #[cfg(test)]
    pub fn local() -> Self {
        Self::new(DisplayZone::Local)
    }

    #[cfg(test)]
    pub fn utc() -> Self {
        Self::new(DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap()))
    }

    /// Project entries in any order into newest-first display rows.
    /// Entries with equal timestamps keep their input order.
    pub fn project(&self, entries: &[StatusChangeEntry]) -> HistoryProjection {
        let mut sorted: Vec<&StatusChangeEntry> = entries.iter().collect();
        // sort_by is stable
        sorted.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));

        let entries: Vec<DisplayEntry> = sorted
            .into_iter()
            .map(|entry| self.display(entry))
            .collect();

        HistoryProjection {
            is_empty: entries.is_empty(),
            entries,
        }
    }

    fn display(&self, entry: &StatusChangeEntry) -> DisplayEntry {
        DisplayEntry {
            badge: BadgeKind::for_status(&entry.status),
            changed_by: entry.changed_by.clone(),
            changed_at: self.zone.format(&entry.changed_at),
            note: entry
                .notes
                .as_deref()
                .filter(|note| !note.trim().is_empty())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use proptest::prelude::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn entry(status: &str, actor: &str, changed_at: DateTime<Utc>) -> StatusChangeEntry {
        StatusChangeEntry {
            status: PropertyStatus::parse(status),
            changed_by: actor.to_string(),
            changed_at,
            notes: None,
        }
    }

    #[test]
    fn test_newest_first() {
        let t1 = at(1_700_000_000);
        let t2 = at(1_700_086_400);
        let projection = StatusHistoryProjector::utc()
            .project(&[entry("sold", "a", t1), entry("available", "b", t2)]);

        assert!(!projection.is_empty);
        let badges: Vec<_> = projection.entries.iter().map(|e| e.badge.clone()).collect();
        assert_eq!(badges, vec![BadgeKind::Success, BadgeKind::Primary]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let t = at(1_700_000_000);
        let projection = StatusHistoryProjector::utc().project(&[
            entry("available", "first", t),
            entry("sold", "newer", at(1_800_000_000)),
            entry("negotiating", "second", t),
            entry("sold", "third", t),
        ]);

        let actors: Vec<_> = projection.entries.iter().map(|e| e.changed_by.as_str()).collect();
        assert_eq!(actors, vec!["newer", "first", "second", "third"]);
    }

    #[test]
    fn test_unknown_status_gets_outline_badge() {
        let projection =
            StatusHistoryProjector::utc().project(&[entry("archived", "a", at(0))]);
        let badge = &projection.entries[0].badge;
        assert_eq!(badge, &BadgeKind::Outline("archived".to_string()));
        assert_eq!(badge.label(), "archived");
    }

    #[test]
    fn test_timestamp_format() {
        let changed_at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        let projection = StatusHistoryProjector::utc().project(&[entry("sold", "a", changed_at)]);
        assert_eq!(projection.entries[0].changed_at, "05/03/2024 at 14:07");

        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let projection = StatusHistoryProjector::new(DisplayZone::Fixed(brt))
            .project(&[entry("sold", "a", changed_at)]);
        assert_eq!(projection.entries[0].changed_at, "05/03/2024 at 11:07");
    }

    #[test]
    fn test_local_zone_follows_dst() {
        // Central European rules; chrono reads TZ per thread on first use
        std::env::set_var("TZ", "CET-1CEST,M3.5.0,M10.5.0/3");

        let winter = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap();
        let projection = StatusHistoryProjector::local()
            .project(&[entry("sold", "a", summer), entry("available", "a", winter)]);

        let stamps: Vec<_> = projection.entries.iter().map(|e| e.changed_at.as_str()).collect();
        assert_eq!(stamps, vec!["15/07/2026 at 14:00", "15/01/2026 at 13:00"]);
    }

    #[test]
    fn test_blank_notes_are_omitted() {
        let mut with_note = entry("sold", "a", at(3));
        with_note.notes = Some("Signed at the notary".to_string());
        let mut blank = entry("sold", "a", at(2));
        blank.notes = Some("   ".to_string());
        let absent = entry("sold", "a", at(1));

        let projection = StatusHistoryProjector::utc().project(&[with_note, blank, absent]);
        let notes: Vec<_> = projection.entries.iter().map(|e| e.note.clone()).collect();
        assert_eq!(notes, vec![Some("Signed at the notary".to_string()), None, None]);
    }

    #[test]
    fn test_empty_history() {
        let projection = StatusHistoryProjector::utc().project(&[]);
        assert!(projection.is_empty);
        assert!(projection.entries.is_empty());
    }

    proptest! {
        #[test]
        fn output_is_sorted_and_ties_are_stable(
            stamps in prop::collection::vec(0i64..5, 0..40)
        ) {
            // The actor field records the input position
            let entries: Vec<_> = stamps
                .iter()
                .enumerate()
                .map(|(i, &s)| entry("available", &i.to_string(), at(s)))
                .collect();

            let projection = StatusHistoryProjector::utc().project(&entries);
            prop_assert_eq!(projection.is_empty, entries.is_empty());
            prop_assert_eq!(projection.entries.len(), entries.len());

            let order: Vec<usize> = projection
                .entries
                .iter()
                .map(|e| e.changed_by.parse().unwrap())
                .collect();
            for pair in order.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(stamps[a] >= stamps[b]);
                if stamps[a] == stamps[b] {
                    prop_assert!(a < b);
                }
            }
        }
    }
}
