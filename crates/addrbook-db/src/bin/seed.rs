//! # Seed Data Generator
//!
//! Populates a user's address collection with sample documents for development.
//!
//! ## Usage
//! ```bash
//! # Seed 12 addresses for the emulator user into ./addrbook_dev.db (defaults)
//! cargo run -p addrbook-db --bin seed
//!
//! # Then view them with the store CLI
//! ADDRBOOK_BACKEND=sqlite ADDRBOOK_DATABASE_PATH=./addrbook_dev.db \
//!     cargo run -p addrbook-store --bin addrbook -- show
//!
//! # Custom user and amount
//! cargo run -p addrbook-db --bin seed -- --uid u1 --count 50
//!
//! # Specify database path
//! cargo run -p addrbook-db --bin seed -- --db ./data/addrbook.db
//! ```
//!
//! `ADDRBOOK_EMULATOR_UID` and `ADDRBOOK_DATABASE_PATH` override the default
//! uid and database path, the same variables the store CLI reads.
//!
//! Log verbosity follows `RUST_LOG` (default `info,addrbook=debug,sqlx=warn`).

use addrbook_core::{addresses_path, validate_uid, Document};
use addrbook_db::{Database, DbConfig};
use serde_json::json;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (city, prefecture, postal prefix) triples for realistic test data
const CITIES: &[(&str, &str, &str)] = &[
    ("Chiyoda", "Tokyo", "100"),
    ("Shibuya", "Tokyo", "150"),
    ("Kita", "Osaka", "530"),
    ("Naka", "Nagoya", "460"),
    ("Chuo", "Sapporo", "060"),
    ("Hakata", "Fukuoka", "812"),
    ("Nakagyo", "Kyoto", "604"),
    ("Aoba", "Sendai", "980"),
];

const STREETS: &[&str] = &[
    "Main St",
    "Station Rd",
    "River Ave",
    "Hill St",
    "Park Ln",
    "Market St",
];

const NAMES: &[&str] = &[
    "Sato", "Suzuki", "Takahashi", "Tanaka", "Ito", "Watanabe", "Yamamoto", "Nakamura",
];

/// Uid the store's local auth emulator signs in as by default.
const DEFAULT_UID: &str = "emulator-user";

const DEFAULT_DB_PATH: &str = "./addrbook_dev.db";

/// Default (uid, database path), taking the store's env overrides into account.
fn seed_defaults(lookup: impl Fn(&str) -> Option<String>) -> (String, String) {
    let uid = lookup("ADDRBOOK_EMULATOR_UID").unwrap_or_else(|| DEFAULT_UID.to_string());
    let db_path = lookup("ADDRBOOK_DATABASE_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
    (uid, db_path)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 12;
    let (mut uid, mut db_path) = seed_defaults(|key| env::var(key).ok());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(12);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--uid" | "-u" => {
                if i + 1 < args.len() {
                    uid = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Addrbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of addresses to generate (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: $ADDRBOOK_DATABASE_PATH or ./addrbook_dev.db)");
                println!("  -u, --uid <UID>    Owner of the addresses (default: $ADDRBOOK_EMULATOR_UID or emulator-user)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    validate_uid(&uid)?;
    let collection = addresses_path(&uid);

    info!(db = %db_path, collection = %collection, count, "Seeding addresses");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let docs = db.documents();

    let existing = docs.count(&collection).await?;
    if existing > 0 {
        warn!(
            existing,
            "Collection already has documents, skipping seed to avoid duplicates"
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for index in 0..count {
        let address = generate_address(index);
        match docs.insert(&collection, &address).await {
            Ok(stored) => {
                generated += 1;
                info!(id = %stored.id, "Inserted address");
            }
            Err(e) => warn!(error = %e, index, "Failed to insert address"),
        }
    }

    info!(
        generated,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );
    println!(
        "View with: ADDRBOOK_BACKEND=sqlite ADDRBOOK_DATABASE_PATH={} ADDRBOOK_EMULATOR_UID={} addrbook show",
        db_path, uid
    );

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,addrbook=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds a deterministic sample address for `index`.
fn generate_address(index: usize) -> Document {
    let (city, prefecture, postal) = CITIES[index % CITIES.len()];
    let street = STREETS[(index / CITIES.len()) % STREETS.len()];
    let name = NAMES[index % NAMES.len()];

    let value = json!({
        "name": name,
        "street": format!("{}-{} {}", index / 10 + 1, index % 10 + 1, street),
        "city": city,
        "prefecture": prefecture,
        "zip": format!("{}-{:04}", postal, index),
    });

    match value {
        serde_json::Value::Object(map) => map,
        _ => Document::new(),
    }
}
