//! Human-readable alert and snapshot messages

use crate::price::PriceSnapshot;
use crate::watch::AssetId;
use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Price with six significant digits, trailing zeros removed
pub fn format_price(price: Decimal) -> String {
    price.round_sf(6).unwrap_or(price).normalize().to_string()
}

/// Signed percentage with two decimals, e.g. `+8.00`
pub fn format_percent(pct: Decimal) -> String {
    let rounded = pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:+.2}", rounded)
}

/// Whole units with thousands separators
fn format_amount(amount: Decimal) -> String {
    match amount.trunc().to_u128() {
        Some(whole) => whole.to_formatted_string(&Locale::en),
        None => amount.trunc().to_string(),
    }
}

/// Multi-line market summary for one asset
pub fn format_snapshot(snapshot: &PriceSnapshot) -> String {
    let change = snapshot
        .change_24h
        .map(|c| format!("{}%", format_percent(c)))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "📊 {}:\n💵 Price: ${}\n📉 24h: {}\n🏦 Market cap: ${}\n📦 Volume: ${}",
        snapshot.name,
        format_price(snapshot.price),
        change,
        format_amount(snapshot.market_cap),
        format_amount(snapshot.volume),
    )
}

/// Threshold alert sent to a subscriber
pub fn format_alert(id: &AssetId, delta_pct: Decimal, snapshot: &PriceSnapshot) -> String {
    format!(
        "📢 {} moved {}%\n{}",
        id.as_str().to_uppercase(),
        format_percent(delta_pct),
        format_snapshot(snapshot)
    )
}

/// Confirmation after a successful subscribe
pub fn format_subscribed(snapshot: &PriceSnapshot) -> String {
    format!(
        "✅ Token {} added!\n{}",
        snapshot.name,
        format_snapshot(snapshot)
    )
}
