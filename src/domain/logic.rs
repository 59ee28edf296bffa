// src/domain/logic.rs

/// The three private-tub rental offerings a listing table can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalCategory {
    OpenAir,
    Indoor,
    Both,
}

/// Routes one rental-table label to exactly one category, or none.
///
/// A label naming both the open-air and the indoor kind is always the
/// combined offering, never either single one, so the checks are keyed on
/// which of the two markers appear rather than on label order.
pub fn classify_rental_label(label: &str) -> Option<RentalCategory> {
    let label = label.to_lowercase();
    let open_air = label.contains("open-air") || label.contains("outdoor");
    let indoor = label.contains("indoor");

    match (open_air, indoor) {
        (true, true) => Some(RentalCategory::Both),
        (true, false) => Some(RentalCategory::OpenAir),
        (false, true) => Some(RentalCategory::Indoor),
        (false, false) => None,
    }
}

/// A rental offering counts as available iff its listed count is a positive
/// number. Non-numeric cells ("-", "Available on request") count as absent.
pub fn rental_count_available(cell: &str) -> bool {
    cell.trim().parse::<u32>().map(|n| n > 0).unwrap_or(false)
}
