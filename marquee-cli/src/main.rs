//! Marquee CLI entry point.

use std::sync::Arc;

use clap::Parser;
use marquee_api::{endpoints, spawn_session_monitor, ApiConnection, Endpoint, WsClient};
use marquee_cli::cli::{CallArgs, Cli, Command};
use marquee_cli::config::CliConfig;
use marquee_cli::error::CliError;
use marquee_cli::telemetry;
use marquee_core::{ItemData, LoadingState};
use marquee_fetch::{
    Connectivity, FetchOptions, IdentityProvider, ReactiveScope, Request, RequestCoordinator, StaticIdentity,
    TracingNotifier,
};
use marquee_store::{CacheStore, InMemoryCacheStore};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.json_logs)?;

    match cli.command {
        Command::Endpoints => {
            print_endpoints();
            Ok(())
        }
        Command::Fetch(args) => {
            let config = CliConfig::load(&cli.config)?;
            run(&config, args, false).await
        }
        Command::Watch(args) => {
            let config = CliConfig::load(&cli.config)?;
            run(&config, args, true).await
        }
    }
}

fn print_endpoints() {
    for table in endpoints::tables() {
        println!("{}", table.name());
        let mut methods: Vec<&str> = table.methods().collect();
        methods.sort_unstable();
        for method in methods {
            println!("  {}", method);
        }
    }
}

async fn run(config: &CliConfig, args: CallArgs, watch: bool) -> Result<(), CliError> {
    let endpoint =
        endpoints::by_name(&args.endpoint).ok_or_else(|| CliError::UnknownEndpoint(args.endpoint.clone()))?;
    let credentials = config.auth.credentials();
    let conn = ApiConnection::rest(&config.api_base_url, &credentials, config.request_timeout())?;
    let store = Arc::new(InMemoryCacheStore::new(config.fetch.api_enums()));

    let (control, connectivity) = Connectivity::channel(true, false);
    let ws = WsClient::new(config.ws_endpoint.clone(), credentials, config.reconnect.clone());
    let monitor = spawn_session_monitor(ws, control.session_sender());

    let identity: Arc<dyn IdentityProvider> = match &config.auth.user_id {
        Some(user_id) => Arc::new(StaticIdentity::new(user_id.clone())),
        None => Arc::new(StaticIdentity::anonymous()),
    };
    let coordinator = RequestCoordinator::builder(conn, store.clone() as Arc<dyn CacheStore>)
        .connectivity(connectivity.clone())
        .identity(identity)
        .notifier(Arc::new(TracingNotifier))
        .config(config.fetch.clone())
        .build();

    let mut session = connectivity.subscribe();
    if !session.is_connected()
        && tokio::time::timeout(config.request_timeout(), session.reconnected())
            .await
            .is_err()
    {
        tracing::warn!(endpoint = %config.ws_endpoint, "Session not connected yet; the call will be queued");
    }

    let scope = ReactiveScope::new();
    coordinator.replay_on_reconnect(&scope);

    let mut request = Request::new(endpoint, args.method.clone());
    for value in args.request_args()? {
        request = request.arg(value);
    }
    let options = FetchOptions {
        skip_cache: args.skip_cache,
        resolve_timeout: config.fetch.resolve_timeout().or(Some(config.request_timeout())),
    };

    let result = if args.items {
        let handle = coordinator
            .use_base_item(request, options, watch.then_some(&scope))
            .await;
        let render = || handle.data().map(items_to_value).transpose();
        report(&args, watch, handle.loading_signal(), render).await
    } else {
        let handle = coordinator.use_api(request, options, watch.then_some(&scope)).await;
        let render = || Ok(handle.data());
        report(&args, watch, handle.loading_signal(), render).await
    };

    scope.close();
    monitor.abort();
    tracing::debug!(stats = ?store.stats(), "Cache statistics");
    result
}

/// Print the current data, then in watch mode every change until Ctrl-C.
async fn report<F>(
    args: &CallArgs,
    watch: bool,
    mut loading: tokio::sync::watch::Receiver<LoadingState>,
    render: F,
) -> Result<(), CliError>
where
    F: Fn() -> Result<Option<Value>, CliError>,
{
    let mut last = render()?;
    match &last {
        Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
        None if !watch => {
            return Err(CliError::NoData {
                endpoint: args.endpoint.clone(),
                method: args.method.clone(),
            })
        }
        None => {}
    }
    if !watch {
        return Ok(());
    }

    loop {
        tokio::select! {
            changed = loading.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = *loading.borrow_and_update();
                if state == LoadingState::Failed {
                    tracing::warn!(endpoint = %args.endpoint, method = %args.method, "Refresh failed");
                    continue;
                }
                if state != LoadingState::Idle {
                    continue;
                }
                let current = render()?;
                if current != last {
                    if let Some(value) = &current {
                        println!("{}", serde_json::to_string_pretty(value)?);
                    }
                    last = current;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                return Ok(());
            }
        }
    }
}

fn items_to_value(data: ItemData) -> Result<Value, CliError> {
    let value = match data {
        ItemData::Single(item) => serde_json::to_value(item)?,
        ItemData::List(items) => serde_json::to_value(items)?,
    };
    Ok(value)
}
