use std::future::IntoFuture;
use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tradesim::{config::SimConfig, engine::driver::spawn_driver, routes, state::build_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("tradesim=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║              TRADESIM — Trade Simulator               ║
  ║   Quotes · Entries · Exits · Journal · Live Monitor   ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Config + shared state ──────────────────────────────────────────────
    let config = SimConfig::from_env();
    let addr: SocketAddr = config.bind_addr.parse()?;
    let state = build_state(config.clone());

    // ── 4. Drive the simulator ────────────────────────────────────────────────
    let mut driver = spawn_driver(state.simulator.clone(), config.frame_interval());

    // ── 5. Bind & Serve ───────────────────────────────────────────────────────
    let app = routes::router(state);

    info!(?addr, "🚀 Tradesim server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // The driver loops forever; if it ever finishes, the simulation is dead.
    tokio::select! {
        served = axum::serve(listener, app).into_future() => {
            driver.abort();
            served?;
        }
        exit = &mut driver => {
            match exit {
                Err(err) if err.is_panic() => error!(%err, "💥 Simulation driver panicked — shutting down"),
                _ => error!("💥 Simulation driver stopped — shutting down"),
            }
            anyhow::bail!("simulation driver exited");
        }
    }

    Ok(())
}
