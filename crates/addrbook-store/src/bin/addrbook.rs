//! # Addrbook CLI
//!
//! Drives the store from the command line against the configured backend.
//! Each run signs in through the local emulator, loads the user's
//! addresses, applies one command and prints the resulting state as JSON.
//!
//! ## Usage
//! ```bash
//! # Show the signed-in user's addresses
//! cargo run -p addrbook-store --bin addrbook -- show
//!
//! # Add, update, delete (sqlite backend keeps them between runs)
//! ADDRBOOK_BACKEND=sqlite cargo run -p addrbook-store --bin addrbook -- add street="Main St" city=Kyoto
//! cargo run -p addrbook-store --bin addrbook -- update <id> city=Osaka
//! cargo run -p addrbook-store --bin addrbook -- delete <id>
//!
//! # Use a specific config file
//! cargo run -p addrbook-store --bin addrbook -- --config ./addrbook.toml show
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use addrbook_core::Document;
use addrbook_store::{NoOpEmitter, Store, StoreConfig};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let config_path = take_config_arg(&mut args)?;

    let command = args.first().cloned().unwrap_or_else(|| "show".to_string());
    if command == "--help" || command == "-h" || command == "help" {
        print_help();
        return Ok(());
    }

    let config = StoreConfig::load(config_path)?;
    let store = Store::from_config(&config, Arc::new(NoOpEmitter)).await?;

    store.login().await?;
    store.refresh_login_user().await?;
    let count = store.fetch_addresses().await?;
    info!(count, "Loaded addresses");

    match command.as_str() {
        "show" => {}
        "add" => {
            let address = store.add_address(parse_fields(&args[1..])?).await?;
            info!(id = %address.id, "Added");
        }
        "update" => {
            let id = args.get(1).ok_or("update needs an address id")?;
            store.update_address(id, parse_fields(&args[2..])?).await?;
        }
        "delete" => {
            let id = args.get(1).ok_or("delete needs an address id")?;
            store.delete_address(id).await?;
        }
        "toggle" => {
            store.toggle_side_menu().await;
        }
        other => return Err(format!("unknown command '{}', try --help", other).into()),
    }

    println!("{}", serde_json::to_string_pretty(&store.snapshot().await)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,addrbook=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Removes `--config <PATH>` from `args`. A flag with no path is an error.
fn take_config_arg(args: &mut Vec<String>) -> Result<Option<PathBuf>, String> {
    let Some(pos) = args.iter().position(|a| a == "--config" || a == "-c") else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        return Err(format!("{} needs a path", args[pos]));
    }
    let path = PathBuf::from(args.remove(pos + 1));
    args.remove(pos);
    Ok(Some(path))
}

/// Parses `key=value` pairs. Values that are valid JSON keep their type.
fn parse_fields(pairs: &[String]) -> Result<Document, String> {
    let mut fields = Document::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{}'", pair))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

fn print_help() {
    println!("Addrbook");
    println!();
    println!("Usage: addrbook [--config <PATH>] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  show                         Print the current state (default)");
    println!("  add key=value...             Create an address");
    println!("  update <id> key=value...     Update an address");
    println!("  delete <id>                  Delete an address");
    println!("  toggle                       Toggle the side menu");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_flag_is_taken_out() {
        let mut list = args(&["-c", "./a.toml", "delete", "a1"]);
        let path = take_config_arg(&mut list).unwrap();
        assert_eq!(path, Some(PathBuf::from("./a.toml")));
        assert_eq!(list, args(&["delete", "a1"]));
    }

    #[test]
    fn test_trailing_config_flag_is_an_error() {
        let mut list = args(&["show", "--config"]);
        assert!(take_config_arg(&mut list).is_err());
    }

    #[test]
    fn test_no_config_flag() {
        let mut list = args(&["show"]);
        assert_eq!(take_config_arg(&mut list).unwrap(), None);
        assert_eq!(list, args(&["show"]));
    }

    #[test]
    fn test_parse_fields_keeps_json_types() {
        let fields = parse_fields(&args(&["zip=1000001", "city=Kyoto"])).unwrap();
        assert_eq!(fields.get("zip"), Some(&serde_json::json!(1000001)));
        assert_eq!(fields.get("city"), Some(&serde_json::json!("Kyoto")));
        assert!(parse_fields(&args(&["nokey"])).is_err());
    }
}
