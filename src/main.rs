use anyhow::Result;
use tracing_subscriber::EnvFilter;
use vitalog::commands::Cli;
use vitalog::libs::messages::macros::is_debug_mode;

fn main() -> Result<()> {
    // Structured logging only when debug output is requested; otherwise the
    // message macros print directly to the console.
    if is_debug_mode() {
        tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    Cli::menu()
}
