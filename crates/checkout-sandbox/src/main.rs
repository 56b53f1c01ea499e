//! # Checkout Sandbox
//!
//! In-memory booking backend for developing and demoing the checkout flow
//! without the production API. Payment settlement is simulated: a delayed
//! task flips bookings to paid, mimicking the processor webhook.
//!
//! ## Usage
//!
//! ```bash
//! # Optional overrides
//! export PORT=8080
//! export WEBHOOK_DELAY_MS=4000
//!
//! checkout-sandbox
//! ```

use checkout_sandbox::{routes, state::{AppConfig, AppState}};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let config = AppConfig::from_env();
    let addr = config.socket_addr();
    let webhook_delay = config.webhook_delay;
    let state = AppState::new(config);

    let app = routes::create_router(state);

    info!("🚗 Checkout sandbox starting on http://{}", addr);
    info!("Simulated webhook delay: {:?}", webhook_delay);
    info!("Create a booking: POST http://{}/api/v1/bookings", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  🚗 transfer-checkout sandbox 🚗
  ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
  In-memory booking backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
