//! Decide which desired records still need painting

use std::collections::HashMap;

use tracing::warn;

use crate::canvas::Cell;

/// Outcome of comparing the desired image with the live canvas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Records to submit, in desired order
    pub records: Vec<String>,
    /// Desired cells the canvas already shows
    pub already_correct: usize,
    /// Desired records that failed to parse
    pub malformed: usize,
}

/// Keep the desired records whose slot is missing or looks different on the
/// live canvas. Without a live canvas every well-formed record is kept.
pub fn plan(desired: &[String], live: Option<&[String]>) -> Plan {
    let live: HashMap<(u16, u16), Cell> = live
        .unwrap_or_default()
        .iter()
        .filter_map(|record| match Cell::parse(record) {
            Ok(cell) => Some(((cell.x(), cell.y()), cell)),
            Err(e) => {
                warn!("Skipping malformed canvas record {:?}: {}", record, e);
                None
            }
        })
        .collect();

    let mut plan = Plan::default();
    for record in desired {
        let cell = match Cell::parse(record) {
            Ok(cell) => cell,
            Err(e) => {
                warn!("Skipping malformed desired record {:?}: {}", record, e);
                plan.malformed += 1;
                continue;
            }
        };

        match live.get(&(cell.x(), cell.y())) {
            Some(current) if current.same_look(&cell) => plan.already_correct += 1,
            _ => plan.records.push(record.clone()),
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_plan_without_canvas_keeps_everything_valid() {
        let desired = records(&["0AA 1 2 ▀", "bogus", "1AA 3 4 ▀"]);
        let plan = plan(&desired, None);
        assert_eq!(plan.records, records(&["0AA 1 2 ▀", "1AA 3 4 ▀"]));
        assert_eq!(plan.malformed, 1);
        assert_eq!(plan.already_correct, 0);
    }

    #[test]
    fn test_plan_skips_correct_cells() {
        let desired = records(&["0AA 1 2 ▀", "1AA 3 4 ▀", "2AA 5 6 ▀"]);
        let live = records(&["0AA 1 2 ▀", "1AA 3 4 _", "junk"]);
        let plan = plan(&desired, Some(&live));
        assert_eq!(plan.records, records(&["1AA 3 4 ▀", "2AA 5 6 ▀"]));
        assert_eq!(plan.already_correct, 1);
        assert_eq!(plan.malformed, 0);
    }
}
