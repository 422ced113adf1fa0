use std::sync::Arc;

use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidnest::bus::{BusEvent, EventKind};
use vidnest::config;
use vidnest::format::format_file_size;
use vidnest::settings::FileStore;
use vidnest::state::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging (stdout + daily file rotation under ./logs)
    std::fs::create_dir_all("logs").ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily("logs", "vidnest.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,vidnest=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Keep the guards alive so the non-blocking writers flush on exit
    let _log_guards = (stdout_guard, file_guard);

    // Load configuration (embedded defaults -> vidnest.toml -> VIDNEST_CONFIG -> env/.env)
    let app_cfg = config::load()?;
    std::fs::create_dir_all(&app_cfg.storage.dir)?;
    let storage = Arc::new(FileStore::new(app_cfg.storage.dir.clone()));

    let ctx = AppContext::new(app_cfg, storage)?;
    info!(server = ctx.api.base_url(), page_size = ctx.settings.page_size(), "vidnest client starting");

    // Toasts are the user-facing channel; in the terminal they become log lines.
    let _toasts = ctx.bus.subscribe(EventKind::Toast, |event| {
        if let BusEvent::Toast(toast) = event {
            info!(title = toast.title(), "{}", toast.message.text());
        }
        Ok(())
    });
    let status = {
        let mut states = WatchStream::new(ctx.push.subscribe_state());
        tokio::spawn(async move {
            while let Some(state) = states.next().await {
                info!(?state, "push stream");
            }
        })
    };

    // Summarize the first page whenever the collection changes.
    let mut changes = ctx.view.subscribe();
    let summary = {
        let view = ctx.view.clone();
        let settings = ctx.settings.clone();
        tokio::spawn(async move {
            let mut last_seen = None;
            while changes.changed().await.is_ok() {
                let (count, loading) = {
                    let state = changes.borrow_and_update();
                    (state.files().len(), state.loading())
                };
                if loading || last_seen == Some(count) {
                    continue;
                }
                last_seen = Some(count);
                let page = view.render(settings.page_size());
                info!(
                    files = count,
                    matching = page.total_items,
                    total_size = %format_file_size(page.total_size),
                    page = page.current_page,
                    pages = page.total_pages,
                    "file list updated"
                );
            }
        })
    };

    ctx.start_push();
    if !ctx.load_files().await {
        warn!("initial file list could not be loaded");
    }

    shutdown_signal().await;

    ctx.teardown().await;
    summary.abort();
    status.abort();
    match serde_json::to_string(&ctx.metrics.get_snapshot()) {
        Ok(json) => info!(metrics = %json, "vidnest client stopped"),
        Err(e) => warn!("metrics snapshot not serializable: {}", e),
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping client...");
}
