use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::actions::Actions;
use crate::api::{ApiGateway, FilesBackend};
use crate::bus::{BusEvent, EventBus, EventKind, Subscription};
use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::error::{ClientError, ClientResult};
use crate::metrics::Metrics;
use crate::push::{apply_push_event, PushListener};
use crate::settings::{KeyValueStore, SettingsStore};
use crate::toast::Toast;
use crate::types::ViewKind;
use crate::view::{RenderedPage, ViewStore};

/// The shared client context.
///
/// Owns everything one running client instance needs: the event bus, the shared view state,
/// the settings, the API gateway and the push listener. It is created once at startup and
/// torn down at shutdown; tests create as many isolated instances as they like.
pub struct AppContext {
    /// The loaded configuration.
    pub config: Arc<AppConfig>,
    /// The event bus shared by all components of this context.
    pub bus: EventBus,
    /// The shared view state.
    ///
    /// Only [`load_files`] replaces the whole collection; everything else mutates cursors or
    /// single entries.
    pub view: Arc<ViewStore>,
    /// Persisted user preferences.
    pub settings: Arc<SettingsStore>,
    /// Gateway for all server calls.
    pub api: ApiGateway,
    /// Source of the file list. The gateway itself unless a test substitutes it.
    pub backend: Arc<dyn FilesBackend>,
    /// User actions (file operations, bookmarks, URL submission).
    pub actions: Actions,
    /// Counters for requests, toasts and push traffic.
    pub metrics: Metrics,
    /// The push stream listener. Not started until [`AppContext::start_push`].
    pub push: Arc<PushListener>,
    debouncer: Debouncer,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl AppContext {
    /// Creates a context that fetches its file list through the API gateway.
    pub fn new(config: AppConfig, storage: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        Self::build(config, storage, None)
    }

    /// Creates a context with a substitute file list source.
    pub fn new_with_backend(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        backend: Arc<dyn FilesBackend>,
    ) -> ClientResult<Self> {
        Self::build(config, storage, Some(backend))
    }

    fn build(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        backend: Option<Arc<dyn FilesBackend>>,
    ) -> ClientResult<Self> {
        crate::config::validate(&config).map_err(|e| ClientError::Config(e.to_string()))?;

        let bus = EventBus::new();
        let metrics = Metrics::new();
        let api = ApiGateway::new(&config.server, bus.clone(), metrics.clone())?;
        let backend = backend.unwrap_or_else(|| Arc::new(api.clone()));
        let initial_view = if config.client.library_view { ViewKind::Library } else { ViewKind::Downloads };
        let view = Arc::new(ViewStore::new(initial_view, config.progress.capacity));
        let settings = Arc::new(SettingsStore::load(storage, &config.storage.settings_key));
        let actions = Actions::new(api.clone(), view.clone(), settings.clone());
        let push = Arc::new(PushListener::new(
            api.http().clone(),
            api.base_url(),
            config.push.clone(),
            bus.clone(),
            metrics.clone(),
        ));
        let debouncer = Debouncer::new(config.client.fetch_debounce());

        let ctx = Self {
            config: Arc::new(config),
            bus,
            view,
            settings,
            api,
            backend,
            actions,
            metrics,
            push,
            debouncer,
            subscriptions: Mutex::new(Vec::new()),
        };
        ctx.wire();
        Ok(ctx)
    }

    /// Internal bus wiring: push messages update the view, refetch requests reload the list.
    fn wire(&self) {
        let on_push = {
            let view = self.view.clone();
            let bus = self.bus.clone();
            self.bus.subscribe(EventKind::PushMessage, move |event| {
                if let BusEvent::PushMessage(ev) = event {
                    apply_push_event(&view, &bus, ev);
                }
                Ok(())
            })
        };

        let on_refetch = {
            let view = self.view.clone();
            let backend = self.backend.clone();
            let settings = self.settings.clone();
            let debouncer = self.debouncer.clone();
            let api = self.api.clone();
            let metrics = self.metrics.clone();
            self.bus.subscribe(EventKind::RefetchFiles, move |_| {
                tokio::runtime::Handle::try_current()
                    .map_err(|e| anyhow::anyhow!("refetch requested outside the runtime: {}", e))?;
                metrics.inc_refetches();
                let (view, backend, settings, api) = (view.clone(), backend.clone(), settings.clone(), api.clone());
                debouncer.call(async move {
                    load_files(&view, backend.as_ref(), &api, &settings).await;
                });
                Ok(())
            })
        };

        self.subscriptions.lock().unwrap_or_else(|e| e.into_inner()).extend([on_push, on_refetch]);
    }

    /// Fetches the list of the current view right away.
    pub async fn load_files(&self) -> bool {
        load_files(&self.view, self.backend.as_ref(), &self.api, &self.settings).await
    }

    /// Switches between downloads and library and reloads.
    pub async fn switch_view(&self, view: ViewKind) -> bool {
        self.view.set_current_view(view);
        self.load_files().await
    }

    /// Requests a debounced reload through the bus.
    pub fn request_refetch(&self) {
        self.bus.publish(BusEvent::RefetchFiles);
    }

    /// Stores the new page size and starts over at page 1.
    pub fn set_page_size(&self, page_size: u32) -> ClientResult<()> {
        let result = self.settings.update(|s| s.page_size = page_size);
        self.view.reset_page();
        result
    }

    pub fn change_page(&self, target: i64) -> u32 {
        self.view.change_page(target, self.settings.page_size())
    }

    pub fn render(&self) -> RenderedPage {
        self.view.render(self.settings.page_size())
    }

    pub fn start_push(&self) {
        info!(url = self.push.url(), "starting push stream");
        self.push.start();
    }

    /// Ends the context: closes the push stream, drops pending refetches, makes the view
    /// state inert and releases every bus registration.
    pub async fn teardown(&self) {
        self.push.shutdown().await;
        self.debouncer.cancel();
        self.view.teardown();
        self.subscriptions.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.bus.clear();
        info!("context torn down");
    }
}

/// Loads the current view's list and replaces the collection. Failures are logged with an
/// error id and reported as a toast; the previous collection stays in place.
///
/// The page size is read when the result lands, and a result for a view that is no longer
/// current is dropped.
pub async fn load_files(
    view: &ViewStore,
    backend: &dyn FilesBackend,
    api: &ApiGateway,
    settings: &SettingsStore,
) -> bool {
    if view.is_closed() {
        return false;
    }
    let kind = view.with(|s| s.current_view());
    if kind.list_path().is_none() {
        view.set_loading(false);
        return false;
    }
    view.set_loading(true);
    let result = backend.list_files(kind).await;
    let current = view.with(|s| s.current_view());
    if current != kind {
        debug!(fetched = ?kind, current = ?current, "file list for a previous view dropped");
        return false;
    }
    view.set_loading(false);
    match result {
        Ok(files) => {
            info!(view = ?kind, count = files.len(), "file list loaded");
            view.replace_files(files, settings.page_size())
        }
        Err(e) => {
            let error_id = Uuid::new_v4();
            error!(%error_id, view = ?kind, "fetching files failed: {}", e);
            api.toast(Toast::new("Error fetching files"));
            false
        }
    }
}
