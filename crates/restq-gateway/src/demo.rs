//! Demo `assets` entity served by the gateway binary.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use restq_core::{Entity, FieldDescriptor, MemoryCollection, SchemaDescriptor};
use restq_proto::{FieldKind, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A catalogue asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub serial: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub listed_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Entity for Asset {
    fn schema() -> Result<SchemaDescriptor<Self>, restq_core::Error> {
        SchemaDescriptor::builder("assets")
            .with_field(FieldDescriptor::identifier("id", |a: &Asset| a.id))
            .with_field(FieldDescriptor::identifier("serial", |a: &Asset| a.serial))
            .with_field(FieldDescriptor::text("code", |a: &Asset| a.code.clone()))
            .with_field(FieldDescriptor::text("name", |a: &Asset| a.name.clone()))
            .with_field(FieldDescriptor::text("description", |a: &Asset| {
                a.description.clone()
            }))
            .with_field(FieldDescriptor::number("price", |a: &Asset| a.price))
            .with_field(FieldDescriptor::number("stock", |a: &Asset| a.stock))
            .with_field(FieldDescriptor::boolean("in_stock", |a: &Asset| a.stock > 0))
            .with_field(FieldDescriptor::temporal("listed_at", |a: &Asset| a.listed_at))
            .with_field(FieldDescriptor::new("tags", FieldKind::Other, |a: &Asset| {
                Value::from(a.tags.clone())
            }))
            .with_identity("id")
            .build()
    }
}

/// Errors loading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load assets from a JSON array.
pub fn load_seed(path: &Path) -> Result<Vec<Asset>, SeedError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Built-in sample assets.
pub fn sample_assets() -> Vec<Asset> {
    let rows: [(i64, &str, &str, Option<&str>, f64, i64, &[&str]); 6] = [
        (1, "LAP-13", "Laptop 13", Some("Light laptop"), 999.0, 4, &["hardware"]),
        (2, "LAP-15", "Laptop 15", Some("Laptop with a larger screen"), 1299.0, 0, &["hardware"]),
        (3, "MON-27", "Monitor 27", None, 329.5, 12, &["hardware", "display"]),
        (4, "KEY-01", "Keyboard", Some("Mechanical keyboard"), 89.0, 30, &[]),
        (5, "MOU-01", "Mouse", Some("Wireless mouse"), 25.0, 55, &[]),
        (6, "DOC-01", "Docking station", Some("Laptop dock"), 189.0, 7, &["hardware"]),
    ];

    rows.into_iter()
        .map(|(id, code, name, description, price, stock, tags)| Asset {
            id,
            serial: Uuid::from_u128(SERIAL_BASE + id as u128),
            code: code.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price,
            stock,
            listed_at: Utc
                .with_ymd_and_hms(2024, 3, id as u32, 9, 0, 0)
                .single()
                .unwrap_or_default(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

const SERIAL_BASE: u128 = 0x5e7a_0000_0000_0000_0000_0000_0000_0000;

/// A memory collection holding the given assets.
pub fn asset_collection(assets: Vec<Asset>) -> MemoryCollection<Asset> {
    MemoryCollection::from(assets)
}
