//! Plain-text views of a turn order.

use std::fmt::Write;

use tracker_core::TurnSnapshot;
use tracker_runtime::CommandReport;

/// Header line above the order.
pub fn status_line(snapshot: &TurnSnapshot) -> String {
    if snapshot.order.is_empty() {
        return "No characters in turn order".to_owned();
    }
    match snapshot.current_entry() {
        Some(entry) => format!("Current Turn: {}", entry.name),
        None => "No active turn".to_owned(),
    }
}

/// Status line followed by one numbered row per entry.
pub fn turn_order(snapshot: &TurnSnapshot) -> String {
    let mut out = status_line(snapshot);
    for (index, entry) in snapshot.order.iter().enumerate() {
        let marker = if snapshot.current == Some(index) { '>' } else { ' ' };
        let _ = write!(out, "\n{marker} {:>2}. {} ({})", index + 1, entry.name, entry.initiative);
        if entry.is_invocation() {
            out.push_str(" [invocation]");
        }
    }
    out
}

/// One-line summary of a request's outcome, if there is anything to say.
pub fn report(report: &CommandReport) -> Option<String> {
    if let Some(rejection) = &report.rejection {
        return Some(format!("refused: {rejection}"));
    }
    if report.inserted > 0 || report.skipped > 0 {
        return Some(format!(
            "added {}, already present {}",
            report.inserted, report.skipped
        ));
    }
    (!report.is_changed()).then(|| "nothing to do".to_owned())
}

#[cfg(test)]
mod tests {
    use tracker_core::{Initiative, ItemId, Stamp, TurnEntry, TurnError};

    use super::*;

    fn snapshot(current: Option<usize>) -> TurnSnapshot {
        TurnSnapshot {
            order: vec![
                TurnEntry::linked(ItemId::new("a"), "Aria", Initiative(12)),
                TurnEntry::invocation("Wolf", Initiative(12)),
            ],
            current,
            stamp: Stamp::ZERO,
        }
    }

    #[test]
    fn status_line_variants() {
        let empty = TurnSnapshot {
            order: Vec::new(),
            current: None,
            stamp: Stamp::ZERO,
        };
        assert_eq!(status_line(&empty), "No characters in turn order");
        assert_eq!(status_line(&snapshot(None)), "No active turn");
        assert_eq!(status_line(&snapshot(Some(1))), "Current Turn: Wolf");
    }

    #[test]
    fn rows_mark_current_and_invocations() {
        let text = turn_order(&snapshot(Some(0)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Current Turn: Aria");
        assert_eq!(lines[1], ">  1. Aria (12)");
        assert_eq!(lines[2], "   2. Wolf (12) [invocation]");
    }

    #[test]
    fn reports_rejections_first() {
        let refused = CommandReport::rejected(TurnError::NoActiveTurn);
        assert!(report(&refused).unwrap().starts_with("refused: no active turn"));
        assert_eq!(report(&CommandReport::changed()), None);
        assert_eq!(report(&CommandReport::unchanged()).as_deref(), Some("nothing to do"));
    }
}
