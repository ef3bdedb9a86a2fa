// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use approuting::{
    config::OperatorConfig,
    constants::{
        DEFAULT_INGRESS_CLASS_NAME, DEFAULT_NIC_CONTROLLER_NAME_PREFIX, DEFAULT_NIC_NAME,
        ERROR_REQUEUE_DURATION_SECS, KIND_NGINX_INGRESS_CONTROLLER, KIND_SECRET_PROVIDER_CLASS,
        TOKIO_WORKER_THREADS,
    },
    context::Context,
    crd::{NginxIngressController, NginxIngressControllerSpec, SecretProviderClass},
    metrics::Metrics,
    reconcile_errors::is_already_exists,
    reconcilers::{
        reconcile_nginx_ingress_controller, reconcile_secret_provider_class,
        retry::retry_api_call,
    },
    server::{run_server, ServerState},
};
use clap::Parser;
use futures::StreamExt;
use kube::{
    api::PostParams,
    runtime::{controller::Action, watcher::Config as WatcherConfig, Controller},
    Client, ResourceExt,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("approuting-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    // Example: 2025-11-29T23:45:00.123456Z main.rs:49 INFO Starting App Routing Operator
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug cargo run
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json cargo run
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting App Routing Operator");
    debug!("Logging initialized with file and line number tracking");

    let config = OperatorConfig::parse();
    config.validate()?;
    debug!(?config, "Operator configuration validated");

    // Initialize Kubernetes client
    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let metrics = Arc::new(Metrics::new()?);

    // The health and metrics server runs on every replica, leader or not,
    // so probes and scrapes keep working while this replica is a follower.
    let server_state = ServerState::new(metrics.clone());
    let metrics_addr = config.metrics_addr.clone();
    let server_task = tokio::spawn({
        let server_state = server_state.clone();
        async move { run_server(server_state, &metrics_addr).await }
    });

    // The watch channel must stay alive for the life of the process: the
    // lease manager stops renewing once its receiver is dropped.
    let leadership = if config.disable_leader_election {
        warn!("Leader election is disabled; run exactly one replica");
        None
    } else {
        Some(wait_for_leadership(client.clone(), &config, &metrics).await?)
    };

    if config.enable_default_nic {
        ensure_default_nic(&client).await?;
    }

    let ctx = Context::new(client.clone(), config, metrics);

    info!("Starting all controllers");

    // Run controllers concurrently
    // Controllers should never exit - if one fails, we log it and exit the main process
    tokio::select! {
        result = run_nginx_ingress_controller(client.clone(), ctx.clone()) => {
            error!("CRITICAL: NginxIngressController controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("NginxIngressController controller exited unexpectedly without error")
        }
        result = run_secret_provider_class_controller(client.clone(), ctx.clone()) => {
            error!("CRITICAL: SecretProviderClass controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("SecretProviderClass controller exited unexpectedly without error")
        }
        result = server_task => {
            error!("CRITICAL: health and metrics server exited unexpectedly: {:?}", result);
            result??;
            anyhow::bail!("health and metrics server exited unexpectedly without error")
        }
        reason = watch_leadership_loss(leadership) => {
            error!("CRITICAL: {reason}; exiting so another replica can take over");
            anyhow::bail!(reason)
        }
        _ = shutdown_signal() => {
            info!("Stopping all controllers and releasing leader election lease...");
            info!("Graceful shutdown completed successfully");
            Ok(())
        }
    }
}

/// Completes when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, initiating graceful shutdown...");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM (pod termination), initiating graceful shutdown...");
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
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
}

/// Block until this replica holds the leader election lease.
///
/// Returns the leadership watch channel. The lease manager task keeps
/// renewing in the background only while a receiver exists, so the caller
/// must hold the channel open for the life of the process.
async fn wait_for_leadership(
    client: Client,
    config: &OperatorConfig,
    metrics: &Arc<Metrics>,
) -> Result<tokio::sync::watch::Receiver<bool>> {
    let pod_name = std::env::var("HOSTNAME").unwrap_or_else(|_| "approuting-operator".to_string());

    info!(
        lease = %config.lease_name,
        namespace = %config.namespace,
        "Waiting to acquire leader election lease"
    );
    metrics.record_leader_status(&pod_name, false);

    let manager = kube_lease_manager::LeaseManagerBuilder::new(client, config.lease_name.clone())
        .with_namespace(config.namespace.clone())
        .with_identity(pod_name.clone())
        .with_duration(config.lease_duration_secs)
        .with_grace(config.lease_grace_secs)
        .build()
        .await
        .map_err(|e| anyhow::anyhow!("failed to build lease manager: {e}"))?;

    let (mut leadership, _lease_task) = manager.watch().await;
    while !*leadership.borrow_and_update() {
        leadership
            .changed()
            .await
            .map_err(|e| anyhow::anyhow!("leader election watch closed: {e}"))?;
    }

    metrics.record_leader_status(&pod_name, true);
    info!(lease = %config.lease_name, "Acquired leader election lease");
    Ok(leadership)
}

/// Completes with a reason when the leader election lease is lost.
///
/// With leader election disabled there is nothing to watch and this future
/// never resolves.
async fn watch_leadership_loss(leadership: Option<tokio::sync::watch::Receiver<bool>>) -> String {
    let Some(mut leadership) = leadership else {
        return std::future::pending().await;
    };

    loop {
        if leadership.changed().await.is_err() {
            return "leader election watch closed unexpectedly".to_string();
        }
        if !*leadership.borrow_and_update() {
            return "leader election lease lost".to_string();
        }
    }
}

/// Create the well-known default `NginxIngressController` if it is missing.
///
/// An existing object is never modified: clusters migrated from older
/// installations keep whatever spec they already carry. Transient API errors
/// at startup are retried with backoff so a flaky API server does not kill
/// the operator before its first reconcile.
async fn ensure_default_nic(client: &Client) -> Result<()> {
    let api = kube::Api::<NginxIngressController>::all(client.clone());

    let existing = retry_api_call(
        || api.get_opt(DEFAULT_NIC_NAME),
        "get default NginxIngressController",
    )
    .await?;
    if existing.is_some() {
        debug!("Default NginxIngressController already exists, leaving it as is");
        return Ok(());
    }

    let default_nic = NginxIngressController::new(
        DEFAULT_NIC_NAME,
        NginxIngressControllerSpec {
            ingress_class_name: DEFAULT_INGRESS_CLASS_NAME.to_string(),
            controller_name_prefix: DEFAULT_NIC_CONTROLLER_NAME_PREFIX.to_string(),
            default_ssl_certificate: None,
            load_balancer_annotations: None,
        },
    );

    let params = PostParams::default();
    match retry_api_call(
        || api.create(&params, &default_nic),
        "create default NginxIngressController",
    )
    .await
    {
        Ok(_) => {
            info!("Created default NginxIngressController");
            Ok(())
        }
        // Lost the create race to another replica; its object stands.
        Err(e)
            if e.downcast_ref::<kube::Error>()
                .is_some_and(is_already_exists) =>
        {
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Run the `NginxIngressController` controller
async fn run_nginx_ingress_controller(client: Client, ctx: Arc<Context>) -> Result<()> {
    info!("Starting NginxIngressController controller");

    let api = kube::Api::<NginxIngressController>::all(client);

    Controller::new(api, WatcherConfig::default())
        .run(reconcile_nginx_ingress_controller_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `NginxIngressController`
async fn reconcile_nginx_ingress_controller_wrapper(
    nic: Arc<NginxIngressController>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    debug!(
        name = %nic.name_any(),
        "Reconcile wrapper called for NginxIngressController"
    );

    let started = Instant::now();
    match reconcile_nginx_ingress_controller(ctx.clone(), nic.clone()).await {
        Ok(action) => {
            ctx.metrics.record_reconciliation_success(
                KIND_NGINX_INGRESS_CONTROLLER,
                started.elapsed(),
            );
            Ok(action)
        }
        Err(e) => {
            error!("Failed to reconcile NginxIngressController: {}", e);
            ctx.metrics
                .record_reconciliation_error(KIND_NGINX_INGRESS_CONTROLLER, started.elapsed());
            Err(e.into())
        }
    }
}

/// Run the `SecretProviderClass` placeholder pod controller
async fn run_secret_provider_class_controller(client: Client, ctx: Arc<Context>) -> Result<()> {
    info!("Starting SecretProviderClass controller");

    let api = kube::Api::<SecretProviderClass>::all(client);

    Controller::new(api, WatcherConfig::default())
        .run(reconcile_secret_provider_class_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `SecretProviderClass`
async fn reconcile_secret_provider_class_wrapper(
    spc: Arc<SecretProviderClass>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    debug!(
        name = %spc.name_any(),
        namespace = ?spc.namespace(),
        "Reconcile wrapper called for SecretProviderClass"
    );

    let started = Instant::now();
    match reconcile_secret_provider_class(ctx.clone(), spc.clone()).await {
        Ok(action) => {
            ctx.metrics
                .record_reconciliation_success(KIND_SECRET_PROVIDER_CLASS, started.elapsed());
            Ok(action)
        }
        Err(e) => {
            error!("Failed to reconcile SecretProviderClass: {}", e);
            ctx.metrics
                .record_reconciliation_error(KIND_SECRET_PROVIDER_CLASS, started.elapsed());
            Err(e.into())
        }
    }
}

/// Error policy for controllers
fn error_policy(
    _resource: Arc<impl std::fmt::Debug>,
    _err: &ReconcileError,
    _ctx: Arc<Context>,
) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
