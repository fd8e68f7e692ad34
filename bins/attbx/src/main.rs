//! AttestBridge CLI and Server Binary
//!
//! This is the main entry point for the AttestBridge application.
//! It provides commands for initializing, validating, and starting
//! the bridge.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config, save_config, validate_config, BridgeConfig,
};
use gateway::{create_router, AppState, ShutdownController};
use observability::{init_logging, init_metrics, LogFormat};
use probe::{load_script, AttachmentPool, TcpTransport};
use router::{Dispatcher, Tables};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let log_format: LogFormat = cli
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging("attbx", log_format)?;

    info!("AttestBridge starting...");
    debug!(?cli, "CLI arguments parsed");

    match cli.command {
        Commands::Start { config, port } => {
            info!("Executing 'start' command");
            start_bridge(config, port).await
        }
        Commands::Validate { config } => {
            info!("Executing 'validate' command");
            validate_command(config).await
        }
        Commands::Init { output } => {
            info!("Executing 'init' command");
            init_command(output).await
        }
    }
}

async fn start_bridge<P: AsRef<Path>>(config_path: P, port_override: Option<u16>) -> Result<()> {
    let config_path = config_path.as_ref();

    // Load and validate config
    let config = load_config(config_path)?;
    let report = validate_config(&config);

    // Log warnings
    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    // Check validation errors
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start bridge due to configuration errors");
    }

    let http_port = port_override.unwrap_or(config.gateway.port);
    if port_override.is_some() {
        debug!(port = http_port, "Gateway port overridden from the command line");
    }

    // Optional Prometheus exporter
    if let Some(metrics_port) = config.observability.metrics_port {
        init_metrics(metrics_port)?;
    }

    info!(
        bridge = %config.bridge.name,
        version = %config.bridge.version,
        http_port,
        "Starting bridge"
    );

    run_bridge(&config, http_port).await
}

/// Wire the router core, attach the targets, and serve the gateway until
/// Ctrl+C.
async fn run_bridge(config: &BridgeConfig, http_port: u16) -> Result<()> {
    let shutdown = ShutdownController::with_ctrl_c();

    // Router core: three pending tables plus the dispatcher task consuming
    // the shared inbound channel.
    let tables = Arc::new(Tables::new());
    let (dispatcher, inbound) = Dispatcher::new(Arc::clone(&tables));
    let dispatcher_handle = tokio::spawn(dispatcher.run(shutdown.child_token()));

    // The agent script is read once and shipped to each target on attach.
    let script = load_script(&config.targets.script_path)
        .with_context(|| format!("Failed to load agent script {}", config.targets.script_path))?;

    let mut targets = AttachmentPool::new();
    let sections = [
        (common::TargetKind::Business, &config.targets.business),
        (common::TargetKind::Personal, &config.targets.personal),
    ];
    for (kind, section) in sections {
        if !section.enabled {
            warn!(target = %kind, "target disabled; requests routed to it will never complete");
            continue;
        }
        match TcpTransport::connect(
            kind,
            &section.endpoint,
            &script,
            inbound.clone(),
            shutdown.child_token(),
        )
        .await
        {
            Ok(transport) => targets.attach(Arc::new(transport)),
            // No failover: the slot stays empty and requests routed to it
            // hang, exactly as they would against a dead device.
            Err(e) => warn!(target = %kind, %e, "failed to attach target; continuing without it"),
        }
    }

    let response_timeout = config
        .gateway
        .response_timeout_seconds
        .map(Duration::from_secs);
    if let Some(timeout) = response_timeout {
        info!(?timeout, "Bounded reply wait enabled");
    }

    let state = Arc::new(AppState::new(
        config.bridge.name.clone(),
        config.bridge.version.clone(),
        tables,
        targets,
        response_timeout,
    ));
    let app = create_router(state);

    let listener = gateway::bind(&config.gateway.host, http_port).await?;
    gateway::serve(listener, app, shutdown.child_token()).await?;

    // The server has drained; stop the dispatcher and transports too.
    shutdown.shutdown();
    let _ = dispatcher_handle.await;

    info!("Bridge shutdown complete");
    Ok(())
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    // Print summary
    println!("\n=== Configuration Validation Report ===\n");

    // Defaults
    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    // Warnings
    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    // Errors
    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Bridge: {}", config.bridge.name);
    println!("Version: {}", config.bridge.version);
    println!("Gateway: {}:{}", config.gateway.host, config.gateway.port);
    println!("Agent script: {}", config.targets.script_path);
    for (name, target) in [
        ("business", &config.targets.business),
        ("personal", &config.targets.personal),
    ] {
        let status = if target.enabled { "enabled" } else { "disabled" };
        println!("Target {}: {} ({})", name, target.endpoint, status);
    }

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    // Generate default config
    let config = generate_default_config();

    // Ensure parent directory exists
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    // Save config
    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This configuration includes:");
    println!("  - Bridge metadata (name, description, version)");
    println!("  - Gateway host/port and the optional bounded reply wait");
    println!("  - Both target attachments (business on 1120, personal on 1119)");
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize settings");
    println!("  2. Point targets.script_path at your agent script");
    println!(
        "  3. Run 'attbx validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  4. Run 'attbx start --config {:?}' to start the bridge",
        output_path
    );

    Ok(())
}
