//! Built-in sample events used when a transformation declares no fixtures

use indexmap::IndexMap;
use serde_json::{json, Value};

/// A fresh copy of the sample-event catalogue, keyed by event type.
///
/// Keys are ordered `Track`, `Identify`, `Page`, `Screen`. Each call builds
/// new values, so callers may mutate the result freely.
#[must_use]
pub fn default_events() -> IndexMap<&'static str, Value> {
    let mut events = IndexMap::with_capacity(4);
    events.insert(
        "Track",
        json!({
            "type": "track",
            "event": "Product Purchased",
            "userId": "test-user-123",
            "anonymousId": "anon-123",
            "messageId": "msg-track-001",
            "timestamp": "2024-01-01T00:00:00.000Z",
            "properties": {
                "product_id": "prod-001",
                "name": "Sample Product",
                "price": 29.99,
                "currency": "USD",
                "quantity": 1
            },
            "context": {
                "library": { "name": "tfsync", "version": "1.0.0" }
            }
        }),
    );
    events.insert(
        "Identify",
        json!({
            "type": "identify",
            "userId": "test-user-123",
            "anonymousId": "anon-123",
            "messageId": "msg-identify-001",
            "timestamp": "2024-01-01T00:00:00.000Z",
            "context": {
                "traits": {
                    "email": "test@example.com",
                    "name": "Test User",
                    "plan": "premium"
                },
                "library": { "name": "tfsync", "version": "1.0.0" }
            }
        }),
    );
    events.insert(
        "Page",
        json!({
            "type": "page",
            "name": "Home",
            "userId": "test-user-123",
            "anonymousId": "anon-123",
            "messageId": "msg-page-001",
            "timestamp": "2024-01-01T00:00:00.000Z",
            "properties": {
                "path": "/",
                "url": "https://example.com/",
                "title": "Home Page",
                "referrer": "https://google.com"
            }
        }),
    );
    events.insert(
        "Screen",
        json!({
            "type": "screen",
            "name": "Dashboard",
            "userId": "test-user-123",
            "anonymousId": "anon-123",
            "messageId": "msg-screen-001",
            "timestamp": "2024-01-01T00:00:00.000Z",
            "properties": {
                "screen_name": "Dashboard",
                "category": "Main"
            }
        }),
    );
    events
}
