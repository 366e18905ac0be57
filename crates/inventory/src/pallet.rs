//! Quantity / case / pallet conversion.
//!
//! All conversions round **up**: a partial pallet still takes a full pallet slot.
//! Zero or negative inputs yield 0; nothing here panics.

/// Ceiling division with the zero/negative clamp shared by every conversion.
fn ceil_div(amount: i64, per: i64) -> i64 {
    if amount <= 0 || per <= 0 {
        return 0;
    }
    amount / per + i64::from(amount % per != 0)
}

/// Pallets needed to hold `qty` units.
pub fn pallets(qty: i64, units_per_pallet: i64) -> i64 {
    ceil_div(qty, units_per_pallet)
}

/// Cases needed to hold `qty` units.
pub fn cases(qty: i64, units_per_case: i64) -> i64 {
    ceil_div(qty, units_per_case)
}

/// Pallets needed to hold `cases` cases.
pub fn pallets_from_cases(cases: i64, cases_per_pallet: i64) -> i64 {
    ceil_div(cases, cases_per_pallet)
}

/// Whole pallets that fit in `qty` units (floor). Used to round down under a capacity ceiling.
pub fn full_pallets(qty: i64, units_per_pallet: i64) -> i64 {
    if qty <= 0 || units_per_pallet <= 0 {
        return 0;
    }
    qty / units_per_pallet
}

/// Round `qty` up to a whole number of pallets, in units.
pub fn round_up_to_pallet(qty: i64, units_per_pallet: i64) -> i64 {
    pallets(qty, units_per_pallet) * units_per_pallet.max(0)
}
