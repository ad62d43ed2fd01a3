//! Page bindings: thin glue between the lifecycle/portfolio modules and a
//! textual rendering. Views issue user-triggered actions and convert every
//! failed action into exactly one notification.

pub mod auth;
pub mod browse;
pub mod dashboard;
pub mod funding;
pub mod layout;
pub mod profile;
pub mod saved;

/// Rupee formatting with Indian digit grouping, e.g. `₹1,00,000`.
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let value = amount.abs().round() as u64;
    let digits = value.to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut head = head.to_string();
        let mut groups = vec![tail.to_string()];
        while head.len() > 2 {
            let split = head.len() - 2;
            groups.push(head.split_off(split));
        }
        if !head.is_empty() {
            groups.push(head);
        }
        groups.reverse();
        groups.join(",")
    };

    format!("{}₹{}", if negative { "-" } else { "" }, grouped)
}
