//! Price text parsing.
//!
//! The upstream sheet stores all three tier prices in one free-text cell, e.g.
//!
//! ```text
//! 24K: ₹7,245 / gram | 22K: ₹6,641 / gram | 18K: ₹5,434 / gram
//! ```
//!
//! Amounts are taken in document order (24K, 22K, 18K). Anything else in the
//! cell is ignored, including extra amounts after the third.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::TierPrices;
use crate::error::ParseError;

/// Currency marker followed by digits with optional thousands separators.
static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"₹([0-9,]+)").expect("amount pattern is valid")
});

/// Extract the 24K/22K/18K prices from a raw price cell.
pub fn parse_prices(text: &str) -> Result<TierPrices, ParseError> {
    let mut amounts = [0.0_f64; 3];
    let mut found = 0;

    for caps in AMOUNT.captures_iter(text).take(3) {
        let raw = &caps[1];
        amounts[found] = parse_amount(raw)?;
        found += 1;
    }

    if found < 3 {
        return Err(ParseError::MissingAmounts { found });
    }

    Ok(TierPrices::new(amounts[0], amounts[1], amounts[2]))
}

/// Parse `"1,23,456"` as `123456`.
fn parse_amount(raw: &str) -> Result<f64, ParseError> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    digits
        .parse::<u64>()
        .map(|v| v as f64)
        .map_err(|_| ParseError::InvalidAmount(raw.to_string()))
}
