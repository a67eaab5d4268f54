mod cli;
mod error;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nbgitops_config::{build_notifiers, load_notify_config};
use nbgitops_core::{Controller, Notifiers};

use crate::cli::{Cli, LogFormat, LogOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.log);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(opts: &LogOpts) {
    let level = if opts.log_level.is_empty() {
        "info"
    } else {
        opts.log_level.as_str()
    };
    let (filter, rejected) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match EnvFilter::try_new(level) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new("info"), Some(level)),
        },
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match opts.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }

    if let Some(level) = rejected {
        warn!(log_level = level, "invalid log level, falling back to info");
    }
}

// The controller runs on the main task; only the signal listener is spawned.
#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.startup_settings().into_controller_config()?;

    let notifiers = match load_notify_config(&cli.sync.notify_services_path)
        .and_then(|notify| build_notifiers(&notify))
    {
        Ok(notifiers) => notifiers,
        Err(e) => {
            warn!(error = %e, "notification services unavailable");
            Notifiers::new()
        }
    };

    let controller = Controller::new(config, Box::new(notifiers))?;
    info!(
        repository = %controller.config().repository.url,
        branch = %controller.config().repository.branch,
        path = %controller.config().repository.relative_path.display(),
        api = %controller.config().api_url,
        frequency = %humantime::format_duration(controller.config().poll_interval),
        sync_once = controller.config().sync_once,
        "starting nbgitops"
    );

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    controller.run(cancel).await?;
    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received");
    token.cancel();
}
