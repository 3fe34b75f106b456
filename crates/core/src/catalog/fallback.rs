//! Built-in route collection installed when the remote catalog is unreachable.

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tracing::error;

use crate::models::Route;

static FALLBACK_ROUTES: Lazy<Vec<Route>> = Lazy::new(|| {
    let raw = json!([
        {
            "id": "1",
            "name": "Line 1 · Central Station ⇄ Airport",
            "type": "bus",
            "from": "Central Station",
            "to": "Airport",
            "duration": "45 min",
            "frequency": "Every 15 min",
            "price": 2.5,
            "status": "On Time",
            "stops": ["Central Station", "City Hall", "Riverside", "Airport"]
        },
        {
            "id": "2",
            "name": "Metro Red · Northgate ⇄ Harbour",
            "type": "metro",
            "from": "Northgate",
            "to": "Harbour",
            "duration": "25 min",
            "frequency": "Every 5 min",
            "price": 1.8,
            "status": "On Time",
            "stops": ["Northgate", "University", "Market Square", "Harbour"]
        },
        {
            "id": "3",
            "name": "Regional Express · Central Station ⇄ Lakeside",
            "type": "train",
            "from": "Central Station",
            "to": "Lakeside",
            "duration": "1 h 10 min",
            "frequency": "Hourly",
            "price": 7.9,
            "status": "Delayed",
            "stops": ["Central Station", "Westfield", "Millbrook", "Lakeside"]
        },
        {
            "id": "4",
            "name": "Tram 7 · Old Town Loop",
            "type": "tram",
            "from": "Old Town",
            "to": "Old Town",
            "duration": "35 min",
            "frequency": "Every 10 min",
            "price": 1.5,
            "status": "On Time",
            "stops": ["Old Town", "Cathedral", "Museum Quarter", "Old Town"]
        },
        {
            "id": "5",
            "name": "Night Bus N2 · Harbour ⇄ Southpark",
            "type": "bus",
            "from": "Harbour",
            "to": "Southpark",
            "duration": "40 min",
            "frequency": "Every 30 min",
            "price": 3.0,
            "status": "On Time",
            "stops": ["Harbour", "Market Square", "Stadium", "Southpark"]
        },
        {
            "id": "6",
            "name": "Ferry F1 · Harbour ⇄ Island Pier",
            "type": "ferry",
            "from": "Harbour",
            "to": "Island Pier",
            "duration": "20 min",
            "frequency": "Every 40 min",
            "price": 4.2,
            "status": "Cancelled",
            "stops": ["Harbour", "Island Pier"]
        }
    ]);
    decode(raw)
});

fn decode(raw: Value) -> Vec<Route> {
    match serde_json::from_value(raw) {
        Ok(routes) => routes,
        Err(err) => {
            error!("built-in route dataset is malformed: {err}");
            Vec::new()
        }
    }
}

/// The built-in dataset.
pub fn fallback_routes() -> Vec<Route> {
    FALLBACK_ROUTES.clone()
}
