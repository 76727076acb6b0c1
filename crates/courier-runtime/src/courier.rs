//! Courier: start and stop receiving for bound targets

use crate::dispatcher::{DispatchContext, release};
use crate::executor::{MainThread, SerialExecutor};
use crate::logging::configure_logging;
use crate::registry::DispatchRegistry;
use crate::runtime::{AsyncRuntime, RuntimeConfig};
use crate::source::EventSource;
use courier_codec::{AssetStore, CodecRegistry, Packager};
use courier_core::{CourierConfig, CourierError, CourierResult, ReceiverState};
use std::any::type_name;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Entry point for receiving events into bound targets
///
/// Subscription work runs on a background runtime; `start_receiving` and
/// `stop_receiving` return immediately with a handle to that work. Events
/// for main-affinity recipients are posted to the [`MainThread`].
///
/// # Example
///
/// ```ignore
/// let courier = Courier::builder(registry)
///     .source(source.clone())
///     .main_thread(main.clone())
///     .build()?;
/// let started = courier.start_receiving(&screen)?;
/// courier.block_on(started).ok();
/// ```
pub struct Courier {
    registry: Arc<DispatchRegistry>,
    ctx: Arc<DispatchContext>,
    runtime: AsyncRuntime,
    config: CourierConfig,
}

impl Courier {
    pub fn builder(registry: DispatchRegistry) -> CourierBuilder {
        CourierBuilder {
            registry,
            config: CourierConfig::default(),
            source: None,
            main: None,
            codecs: None,
            assets: None,
            handle: None,
            logging: false,
        }
    }

    /// Subscribe `target` to everything its type and ancestors declare
    ///
    /// A running start for the same target is superseded; its listeners are
    /// released before the new ones are added.
    pub fn start_receiving<T: Send + Sync + 'static>(
        &self,
        target: &Arc<T>,
    ) -> CourierResult<JoinHandle<()>> {
        let dispatcher = self.registry.dispatcher::<T>().ok_or_else(|| {
            CourierError::MissingDispatcher(
                self.registry
                    .name_of::<T>()
                    .map(str::to_string)
                    .unwrap_or_else(|| type_name::<T>().to_string()),
            )
        })?;

        let (session, previous) = dispatcher.begin(target);
        debug!(name = %dispatcher.name(), restart = !previous.is_empty(), "start receiving");
        let ctx = self.ctx.clone();
        let target = target.clone();
        Ok(self.runtime.spawn(async move {
            release(ctx.source.as_ref(), previous).await;
            dispatcher.run(&ctx, session, target).await;
        }))
    }

    /// Remove every listener added for `target`
    ///
    /// Takes effect at once for deliveries: a start still in flight releases
    /// whatever it subscribes afterwards. Stopping a target that is not
    /// receiving does nothing.
    pub fn stop_receiving<T: Send + Sync + 'static>(
        &self,
        target: &Arc<T>,
    ) -> CourierResult<JoinHandle<()>> {
        let dispatcher = self
            .registry
            .dispatcher::<T>()
            .ok_or_else(|| CourierError::MissingDispatcher(type_name::<T>().to_string()))?;

        let subscriptions = dispatcher.stop(target).unwrap_or_default();
        let ctx = self.ctx.clone();
        Ok(self.runtime.spawn(async move {
            release(ctx.source.as_ref(), subscriptions).await;
        }))
    }

    /// Receiving state of `target`; `Idle` for types without a dispatcher
    pub fn receiver_state<T: Send + Sync + 'static>(&self, target: &Arc<T>) -> ReceiverState {
        self.registry
            .dispatcher::<T>()
            .map(|d| d.state(target))
            .unwrap_or_default()
    }

    /// Wait for background work from a sync context
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn source(&self) -> &Arc<dyn EventSource> {
        &self.ctx.source
    }

    /// Encoder for values sent through the source
    pub fn packager(&self) -> &Packager {
        &self.ctx.packager
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for Courier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Courier")
            .field("registry", &self.registry)
            .field("runtime", &self.runtime)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`Courier`]
pub struct CourierBuilder {
    registry: DispatchRegistry,
    config: CourierConfig,
    source: Option<Arc<dyn EventSource>>,
    main: Option<Arc<dyn MainThread>>,
    codecs: Option<Arc<CodecRegistry>>,
    assets: Option<Arc<dyn AssetStore>>,
    handle: Option<Handle>,
    logging: bool,
}

impl CourierBuilder {
    pub fn config(mut self, config: CourierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn source(mut self, source: Arc<dyn EventSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Foreground executor; defaults to a [`SerialExecutor`]
    pub fn main_thread(mut self, main: Arc<dyn MainThread>) -> Self {
        self.main = Some(main);
        self
    }

    /// Payload decoders; defaults to the primitive set
    pub fn codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = Some(Arc::new(codecs));
        self
    }

    pub fn assets(mut self, assets: Arc<dyn AssetStore>) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Run on a runtime the host already owns instead of starting one
    pub fn runtime_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Install process-wide logging at the configured `log_level`
    pub fn with_logging(mut self) -> Self {
        self.logging = true;
        self
    }

    pub fn build(self) -> CourierResult<Courier> {
        if self.logging
            && let Err(e) = configure_logging(self.config.level())
        {
            warn!(error = %e, "logging left as installed by the host");
        }

        let source = self
            .source
            .ok_or_else(|| CourierError::Config("an event source is required".to_string()))?;

        let runtime = match self.handle {
            Some(handle) => AsyncRuntime::from_handle(handle),
            None => AsyncRuntime::new(RuntimeConfig::from(&self.config))?,
        };

        let main: Arc<dyn MainThread> = match self.main {
            Some(main) => main,
            None => Arc::new(SerialExecutor::new(self.config.main_thread_name.clone())?),
        };

        let codecs = self
            .codecs
            .unwrap_or_else(|| Arc::new(CodecRegistry::new()));
        let mut packager = Packager::new(codecs);
        if let Some(assets) = self.assets {
            packager = packager.with_assets(assets);
        }

        let ctx = Arc::new(DispatchContext {
            source,
            main,
            packager,
            deliver_local_data: self.config.deliver_local_data,
            handle: runtime.handle().clone(),
        });

        info!(
            dispatchers = self.registry.len(),
            owns_runtime = runtime.owns_runtime(),
            deliver_local_data = ctx.deliver_local_data,
            "courier ready"
        );

        Ok(Courier {
            registry: Arc::new(self.registry),
            ctx,
            runtime,
            config: self.config,
        })
    }
}
