use crate::telemetry::OrderOutcome;

/// Checks that an order row is internally consistent. Returns a description of
/// the first problem found, `None` if the row is valid.
pub fn validate_order_outcome(row: &OrderOutcome) -> Option<String> {
    match (row.delivered, row.completion_time, row.delivered_by) {
        (true, None, _) => {
            return Some(format!("Order {}: delivered without completion_time", row.id))
        }
        (true, _, None) => {
            return Some(format!("Order {}: delivered without delivered_by", row.id))
        }
        (false, Some(_), _) => {
            return Some(format!("Order {}: completion_time set but not delivered", row.id))
        }
        (false, _, Some(_)) => {
            return Some(format!("Order {}: delivered_by set but not delivered", row.id))
        }
        _ => {}
    }
    if let Some(completed) = row.completion_time {
        if completed < row.release_time {
            return Some(format!(
                "Order {}: completion_time ({completed}) < release_time ({})",
                row.id, row.release_time
            ));
        }
        if row.is_late != (completed > row.deadline) {
            return Some(format!(
                "Order {}: is_late = {} but completion_time {completed} vs deadline {}",
                row.id, row.is_late, row.deadline
            ));
        }
    } else if row.is_late {
        return Some(format!("Order {}: undelivered order flagged late", row.id));
    }
    None
}
