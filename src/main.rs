use tracing::info;

use filevault::file::Bucket;
use filevault::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = filevault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        filevault::logging::init_console_only(&config.logging.level);
    }

    info!("Filevault - file storage and sharing service");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let bucket = match Bucket::new(&config.storage.bucket_path) {
        Ok(bucket) => bucket,
        Err(e) => {
            eprintln!("Failed to open blob bucket: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = filevault::web::serve(config, db, bucket).await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
