//! dirsnap — directory size inventory with persistent snapshots.
//!
//! Thin binary entry point. All logic lives in the `dirsnap-core`
//! and `dirsnap-cli` crates.

fn main() -> anyhow::Result<()> {
    // Initialise structured logging. Scan progress is rendered on stderr as
    // plain text, so log records go to stderr too and stdout stays clean
    // for summaries and exports.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    dirsnap_cli::run()
}
