//! Grid placement of dashboard cards

use fmdash_core::{AnalyticDescriptor, LayoutItem};

/// Grid width in columns; every card spans it
pub const GRID_COLUMNS: u32 = 12;

/// Endpoints rendered as short stat cards
pub const COMPACT_ENDPOINTS: [&str; 5] = [
    "customer_experience_feedback",
    "customer_rating_overview",
    "helpdesk_snapshot",
    "amc_contract_summary",
    "engagement_metrics",
];

const MIN_WIDTH: u32 = 4;

/// Whether cards for `endpoint` use the compact height
pub fn is_compact(endpoint: &str) -> bool {
    COMPACT_ENDPOINTS.contains(&endpoint)
}

/// Layout for the cards in `selection`
///
/// Cards that already have an entry in `existing` keep it. New cards are
/// stacked below the lowest existing card, offset by their position in the
/// selection. Entries for cards no longer selected are dropped.
pub fn arrange(selection: &[AnalyticDescriptor], existing: &[LayoutItem]) -> Vec<LayoutItem> {
    let max_y = existing.iter().map(LayoutItem::bottom).max().unwrap_or(0);

    selection
        .iter()
        .enumerate()
        .map(|(index, analytic)| {
            if let Some(item) = existing.iter().find(|item| item.i == analytic.id) {
                return item.clone();
            }

            let (h, min_h) = if is_compact(&analytic.endpoint) { (4, 3) } else { (6, 5) };
            let row = u32::try_from(index).unwrap_or(u32::MAX);
            LayoutItem {
                i: analytic.id.clone(),
                x: 0,
                y: max_y.saturating_add(row.saturating_mul(h)),
                w: GRID_COLUMNS,
                h,
                min_w: Some(MIN_WIDTH),
                min_h: Some(min_h),
            }
        })
        .collect()
}

/// Move `active` to the position of `over`, shifting the items between
///
/// Returns `false` and leaves `order` untouched when either id is missing.
pub fn move_item(order: &mut Vec<String>, active: &str, over: &str) -> bool {
    let (Some(from), Some(to)) = (
        order.iter().position(|id| id == active),
        order.iter().position(|id| id == over),
    ) else {
        return false;
    };
    if from != to {
        let item = order.remove(from);
        order.insert(to, item);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmdash_core::Module;
    use pretty_assertions::assert_eq;

    fn item(i: &str, y: u32, h: u32) -> LayoutItem {
        LayoutItem {
            i: i.to_string(),
            x: 0,
            y,
            w: GRID_COLUMNS,
            h,
            min_w: Some(4),
            min_h: Some(5),
        }
    }

    #[test]
    fn test_new_cards_stack_below_existing_ones() {
        let existing = vec![item("a", 0, 6), item("b", 6, 6)];
        let selection = vec![
            AnalyticDescriptor::new("a", Module::Amc, "status_overview", "A"),
            AnalyticDescriptor::new("b", Module::Amc, "service_stats", "B"),
            AnalyticDescriptor::new("c", Module::Tickets, "ticket_status", "C"),
        ];

        let layout = arrange(&selection, &existing);
        assert_eq!(layout[0], existing[0]);
        assert_eq!(layout[1], existing[1]);
        assert_eq!(layout[2].y, 12 + 2 * 6);
        assert_eq!(layout[2].h, 6);
        assert_eq!(layout[2].min_h, Some(5));
        assert_eq!(layout[2].w, 12);
    }

    #[test]
    fn test_compact_cards_are_shorter() {
        let selection = vec![AnalyticDescriptor::new(
            "snap",
            Module::Helpdesk,
            "helpdesk_snapshot",
            "Snapshot",
        )];

        let layout = arrange(&selection, &[]);
        assert_eq!(layout[0].y, 0);
        assert_eq!(layout[0].h, 4);
        assert_eq!(layout[0].min_h, Some(3));
        assert_eq!(layout[0].min_w, Some(4));
    }

    #[test]
    fn test_removed_cards_lose_their_layout() {
        let existing = vec![item("a", 0, 6), item("gone", 6, 6)];
        let selection = vec![AnalyticDescriptor::new("a", Module::Amc, "status_overview", "A")];

        let layout = arrange(&selection, &existing);
        assert_eq!(layout, vec![item("a", 0, 6)]);
    }

    #[test]
    fn test_move_item() {
        let mut order: Vec<String> = ["a", "b", "c", "d"].iter().map(ToString::to_string).collect();

        assert!(move_item(&mut order, "a", "c"));
        assert_eq!(order, vec!["b", "c", "a", "d"]);

        assert!(move_item(&mut order, "d", "b"));
        assert_eq!(order, vec!["d", "b", "c", "a"]);

        assert!(!move_item(&mut order, "x", "b"));
        assert_eq!(order, vec!["d", "b", "c", "a"]);
    }
}
