//! StudyLife CLI and REST API entry point.
//!
//! Binary name: `studylife`
//!
//! Parses CLI arguments, sets up tracing, loads configuration and the
//! profile store, then dispatches to a command handler or starts the
//! REST API server.

mod cli;
mod http;
mod state;

use anyhow::anyhow;
use clap::Parser;
use clap_complete::generate;
use console::style;

use cli::{Cli, Commands};
use state::AppState;
use studylife_observe::tracing_setup::{
    TracingOptions, filter_for_verbosity, init_tracing, shutdown_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = TracingOptions {
        default_filter: filter_for_verbosity(cli.verbose, cli.quiet).to_string(),
        json: cli.log_json,
        otel: cli.otel,
    };
    init_tracing(&options).map_err(|e| anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "studylife", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = run(cli, state).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    let json = cli.json;

    match cli.command {
        Commands::Auth { action } => {
            cli::auth::handle_auth_command(action, &state, json).await?;
        }

        Commands::Pomodoro { sessions } => {
            cli::pomodoro::run(&state.notices, sessions, json).await?;
        }

        Commands::Serve { port, host } => serve(state, &host, port).await?,

        Commands::Completions { .. } => unreachable!("handled before state init"),

        command => {
            let identity = cli::resolve_identity(&state, cli.user.as_deref()).await?;
            let mut ws = state.open_workspace(identity).await;
            // The chat loop prints notices as they arrive.
            let notices_shown = matches!(command, Commands::Chat);

            let result = match command {
                Commands::Profile { action } => {
                    cli::profile::handle_profile_command(action, &mut ws, json).await
                }
                Commands::Task { action } => {
                    cli::task::handle_task_command(action, &mut ws, json).await
                }
                Commands::Plan { topic } => {
                    cli::plan::generate_plan(&mut ws, &topic.join(" "), json).await
                }
                Commands::Insight => cli::insight::generate_insight(&mut ws, json).await,
                Commands::Chat => cli::chat::run_chat(&mut ws).await,
                Commands::Sos => cli::sos::activate(&mut ws, json),
                Commands::Status => cli::status::status(&state, &ws, json).await,
                _ => Ok(()),
            };

            // One-shot process: save edits now rather than after the window.
            ws.flush().await;
            ws.close();
            cli::print_notices(&state, json || cli.quiet || notices_shown);
            result?;
        }
    }

    Ok(())
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} StudyLife API listening on {}",
        style("⚡").bold(),
        style(format!("http://{addr}")).cyan()
    );
    if !state.assistant_configured() {
        println!(
            "  {}",
            style("GEMINI_API_KEY not set: assistant features will reply with fallbacks").yellow()
        );
    }
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state.clone());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.close_all().await;
    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
