//! Customer notification message and WhatsApp deep link
//!
//! Pure string construction: nothing here talks to the network.

use crate::core::order::Order;
use crate::core::pricing::UnitPrices;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// Bytes left as-is in the `text` query value; everything else is `%XX`
const MESSAGE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Result of the notify operation
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub message: String,
    pub notification: String,
    pub whatsapp_link: String,
}

impl Notification {
    pub fn for_order(order: &Order, prices: &UnitPrices) -> Self {
        let notification = render_notification(order, prices);
        let whatsapp_link = contact_link(&order.phone_number, &notification);
        Self {
            message: "WhatsApp link generated successfully".to_string(),
            notification,
            whatsapp_link,
        }
    }
}

/// Order summary addressed to the customer
pub fn render_notification(order: &Order, prices: &UnitPrices) -> String {
    format!(
        "Hello {name}, thank you for your order!\n\n\
         Order Summary:\n\
         - Large Lontong: {large} x {large_price} IDR\n\
         - Small Lontong: {small} x {small_price} IDR\n\
         Total: {total} IDR\n\n\
         Customer Address: {address}\n\n\
         We will process your order and inform you once it's ready for pickup.\
         \n\nThank you for choosing us!",
        name = order.name,
        large = order.total_lontong_large,
        large_price = prices.large_unit_price,
        small = order.total_lontong_small,
        small_price = prices.small_unit_price,
        total = order.total_price,
        address = order.address,
    )
}

/// `https://wa.me/{phone}?text={message}` for the rendered summary
pub fn build_contact_link(order: &Order, prices: &UnitPrices) -> String {
    contact_link(&order.phone_number, &render_notification(order, prices))
}

fn contact_link(phone_number: &str, message: &str) -> String {
    let phone = phone_number.strip_prefix('+').unwrap_or(phone_number);
    let encoded = utf8_percent_encode(message, MESSAGE_ENCODE_SET);
    format!("{WHATSAPP_BASE_URL}{phone}?text={encoded}")
}
