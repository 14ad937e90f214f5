//! Basic Satchel Example - Booking Desk
//!
//! This example demonstrates the core sync flow:
//! - Building a context with a backend and an endpoint
//! - Optimistic writes that keep working offline
//! - Watching status transitions through a subscription
//! - Draining the pending queue once connectivity returns
//!
//! Run with: cargo run -p booking_desk

use satchel_core::{MockEndpoint, Ops, Record, RetryConfig, SyncContext};
use serde::{Deserialize, Serialize};

/// A booking record as a feature module would define it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Booking {
    id: String,
    customer: String,
    day: String,
    seats: u8,
}

impl Record for Booking {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Booking {
    fn new(id: &str, customer: &str, day: &str, seats: u8) -> Self {
        Self {
            id: id.to_string(),
            customer: customer.to_string(),
            day: day.to_string(),
            seats,
        }
    }
}

fn main() {
    println!("Booking Desk Example");
    println!("====================\n");

    // A scriptable endpoint stands in for the real backend; start with
    // the network down.
    let endpoint = MockEndpoint::unreachable();

    let context = SyncContext::builder()
        .endpoint(endpoint.clone())
        .retry(RetryConfig::no_retry())
        .build();
    println!("[OK] Context built (endpoint currently unreachable)");

    // A status indicator, as a UI widget would wire it.
    let _indicator = context.subscribe(|state| {
        println!("     status -> {} ({} pending)", state.status, state.pending_count);
    });

    let bookings: Ops<Booking> = context.ops("bookings");

    // Writes keep working while offline.
    println!("\n[+] Taking bookings while offline...");
    bookings.persist(&Booking::new("b1", "Alice", "2026-08-10", 2));
    bookings.persist(&Booking::new("b2", "Bonnie", "2026-08-10", 4));
    bookings.persist(&Booking::new("b1", "Alice", "2026-08-11", 2)); // moved a day

    let cached = bookings.cached();
    println!("[OK] {} booking(s) visible locally:", cached.len());
    for booking in &cached {
        println!("     {} - {} on {} ({} seats)", booking.id, booking.customer, booking.day, booking.seats);
    }
    println!("     {} operation(s) waiting for the network", context.pending_count());

    // Bulk reorder through persist_all.
    println!("\n[~] Reordering the book...");
    let mut reordered = bookings.cached();
    reordered.sort_by(|a, b| a.customer.cmp(&b.customer));
    bookings.persist_all(&reordered);

    // Connectivity returns; the backlog drains in enqueue order.
    println!("\n[*] Network is back, flushing...");
    endpoint.set_reachable(true);
    context.set_online(true);

    let state = context.status();
    println!("[OK] Drained: status {}, {} pending", state.status, state.pending_count);

    // Reads reconcile against the (mock) remote while staying usable.
    println!("\n[*] Loading bookings...");
    let remote_snapshot = serde_json::to_value(&reordered).unwrap();
    endpoint.enqueue_response(&remote_snapshot);
    let loaded = bookings.load();
    println!("[OK] {} booking(s) loaded", loaded.len());

    println!("\n[#] Endpoint saw {} call(s) in total", endpoint.call_count());
}
