//! Binary entry point: resolve paths, start file logging, open the contact
//! store, and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use contact_manager::logging::init_logging;
use contact_manager::{run_app, App, AppPaths, Store};
use tracing::{error, info};

/// A store that cannot be opened stops the program before the terminal UI is
/// shown; there is no half-initialized mode.
fn main() -> anyhow::Result<()> {
    let paths = AppPaths::resolve()?;
    init_logging(&paths.log_path)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting contact manager");

    let store = Store::open(&paths.db_path)
        .map_err(|err| {
            error!(error = ?err, "contact store unavailable");
            err
        })
        .with_context(|| format!("cannot open contact store at {}", paths.db_path.display()))?;

    let mut app = App::new(store);
    app.reload();
    let result = run_app(&mut app);
    if let Err(err) = &result {
        error!(error = ?err, "terminal loop failed");
    }

    app.finish(result)?;
    info!("contact manager stopped");
    Ok(())
}
