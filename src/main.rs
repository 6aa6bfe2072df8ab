use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use homeward::{
    create_router, init_pool, list_devices, run_migrations, AppState, Config, TrackerRegistry,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Required: HOMEWARD_HOME_LATITUDE, HOMEWARD_HOME_LONGITUDE");
            eprintln!("Optional: HOMEWARD_LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: HOMEWARD_DATABASE_URL (default: sqlite://homeward.db)");
            eprintln!("Optional: HOMEWARD_EXTERNAL_URL");
            eprintln!("Optional: HOMEWARD_SIGNIFICANT_CHANGE_METERS (default: 10)");
            eprintln!("Optional: HOMEWARD_METERS_PER_MILE (default: 1609.34)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting Homeward server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Database: {}", config.database_url);
    tracing::info!("Home: {}", config.home);

    // Connect to database
    let pool = match init_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Database connection error: {}", e);
            std::process::exit(1);
        }
    };

    // Run migrations
    if let Err(e) = run_migrations(&pool).await {
        eprintln!("Migration error: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Database migrations completed");

    // Set up a tracker per registered device
    let registry = TrackerRegistry::new(config.home, config.policy);
    match list_devices(&pool).await {
        Ok(devices) => {
            registry.restore(&devices);
            tracing::info!("Loaded {} devices", devices.len());
        }
        Err(e) => {
            eprintln!("Failed to load devices: {}", e);
            std::process::exit(1);
        }
    }

    let state = AppState::new(pool, registry, &config.webhook_base_url());
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server running at http://{}", config.listen_addr);

    axum::serve(listener, app).await.expect("Server error");
}
