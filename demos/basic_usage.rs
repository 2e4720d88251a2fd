//! Basic logger usage example
//!
//! Demonstrates levels, context interpolation, file formats, the PRINT
//! bypass and the value dumper.
//!
//! Run with: cargo run --example basic_usage

use sink_logger::prelude::*;
use sink_logger::sinks::{DatabaseSink, MemoryStore};
use sink_logger::{info, warning};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct Endpoint {
    host: String,
    ports: Vec<u16>,
    tls: Option<bool>,
}

impl Describable for Endpoint {
    fn describe(&self, d: &mut sink_logger::dump::Dumper) {
        let mut s = d.structure("Endpoint");
        s.field("host", &self.host);
        s.field("ports", &self.ports);
        s.field("tls", &self.tls);
        s.finish();
    }
}

fn main() -> Result<()> {
    println!("=== Sink Logger - Basic Usage Example ===\n");

    let log_dir = std::env::temp_dir().join("sink_logger_demo");
    let store = Arc::new(MemoryStore::new());

    let config = LoggerConfig::default()
        .with_level(LogLevel::Debug)
        .with_flags(FieldFlags::ALL.without(FieldFlags::CONSOLE_AS_JSON).with(FieldFlags::COLOR))
        .with_outputs(OutputMask::CONSOLE | OutputMask::FILE | OutputMask::DATABASE)
        .with_log_dir(&log_dir)
        .with_file_format(LogFormat::Csv);

    let mut logger = Logger::builder()
        .config(config)
        .database(DatabaseSink::new(Arc::clone(&store)))
        .async_mode(256)
        .workers(2)
        .build();

    println!("1. Logging at different levels:");
    logger.emergency("This is an emergency message", Fields::new());
    logger.error("This is an error message", Fields::new());
    logger.notice("This is a notice message", Fields::new());
    logger.debug("This is a debug message", Fields::new());

    println!("\n2. Context interpolation:");
    info!(logger, "user :user signed in from {ip}", user = "ana", ip = "10.0.0.7");
    warning!(logger, "disk :disk at :pct%", disk = "/dev/sda1", pct = 91);

    println!("\n3. Raising the level to ERROR (PRINT still shows):");
    logger.set_level(LogLevel::Error);
    logger.info("Info message (hidden)", Fields::new());
    logger.print("PRINT ignores the level", Fields::new());

    println!("\n4. Dumping values:");
    let endpoint = Endpoint {
        host: "db-01".to_string(),
        ports: vec![5432, 5433],
        tls: Some(true),
    };
    let mut limits = BTreeMap::new();
    limits.insert("connections", 100u32);
    limits.insert("timeout_secs", 30u32);
    logger.dump(&endpoint);
    logger.dump_many(&[&limits, &"done"]);

    if !logger.shutdown(Duration::from_secs(5)) {
        eprintln!("Logger shutdown timed out");
    }

    println!("\n5. Database sink received {} records", store.documents().len());
    println!("   File output written under {}", log_dir.display());
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
