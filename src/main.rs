// Entrypoint for the CLI application.
// - Keeps `main` small: resolve configuration and credentials, then hand
//   them to the interactive menu.
// - Runs on a single-threaded runtime; batch requests interleave at their
//   network calls.

use anyhow::Context;
use hme_cli::config::Config;
use hme_cli::credentials::Credentials;
use hme_cli::interrupt::InterruptRouter;
use hme_cli::telemetry::init_tracing;
use hme_cli::ui::main_menu;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _telemetry = init_tracing("warn");

    let config = Config::from_env().context("invalid HME_* configuration")?;
    let cookie_file = config.resolve_cookie_file();
    let credentials = Credentials::load(&cookie_file)
        .with_context(|| format!("failed to read cookie file {}", cookie_file.display()))?;

    let interrupts = InterruptRouter::new();
    let _listener = interrupts.install();

    main_menu(config, credentials, &interrupts).await
}
