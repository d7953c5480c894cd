//! The interpreter: a command queue drained by one dedicated worker thread.
//!
//! ```text
//! put_command ─┐
//! put_command ─┼──▶ queue ──▶ worker ──▶ reload?        ──▶ registry.reload
//! stop ────────┘                    └──▶ conversation?  ──▶ continuation
//!                                   └──▶ otherwise      ──▶ router
//!                                              │
//!                                              ▼
//!                                   settle ──▶ ReplySink::add_reply
//! ```
//!
//! Any number of threads or tasks may enqueue through cloned
//! [`CommandSender`]s. The worker owns the modules, the configuration and the
//! pending conversation outright and handles one item at a time in arrival
//! order, so none of that state is ever locked.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde_json::Value;
use tracing::{debug, debug_span, info};

use conch_core::{
    CommandReceiver, CommandSender, ModuleContext, NullSink, QueueItem, Reply, ReplySink,
    command_queue,
};
use conch_framework::{Conversation, ModuleCatalog, ModuleRegistry, Router};

use crate::config::{ConchConfig, ModulesConfig};
use crate::error::{RuntimeError, RuntimeResult};

/// First token that turns a command into a reload request.
pub const RELOAD_COMMAND: &str = "reload";

/// Default name of the worker thread.
const DEFAULT_THREAD_NAME: &str = "conch-worker";

// =============================================================================
// InterpreterBuilder
// =============================================================================

/// Configures and spawns an [`Interpreter`].
///
/// ```rust,ignore
/// let interpreter = Interpreter::builder()
///     .sink(|reply: Reply| println!("{}", reply.text))
///     .config(&config)
///     .spawn()?;
/// ```
pub struct InterpreterBuilder {
    catalog: Option<ModuleCatalog>,
    sink: Arc<dyn ReplySink>,
    configuration: Option<Value>,
    modules: ModulesConfig,
    thread_name: String,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self {
            catalog: None,
            sink: Arc::new(NullSink),
            configuration: None,
            modules: ModulesConfig::default(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl InterpreterBuilder {
    /// Creates a builder with an empty selection of settings.
    ///
    /// Unless [`catalog`](Self::catalog) is called, modules are discovered
    /// from everything exported with `export_module!`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `catalog` instead of the discovered modules.
    pub fn catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the client receiving every reply.
    pub fn sink(mut self, sink: impl ReplySink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Sets an already shared client.
    pub fn shared_sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the configuration applied once all modules are loaded.
    pub fn configuration(mut self, cfg: Value) -> Self {
        self.configuration = Some(cfg);
        self
    }

    /// Restricts which catalog modules are loaded.
    pub fn modules(mut self, modules: ModulesConfig) -> Self {
        self.modules = modules;
        self
    }

    /// Takes the module selection and settings from a loaded configuration.
    pub fn config(mut self, config: &ConchConfig) -> Self {
        self.modules = config.modules.clone();
        if let Some(settings) = config.settings() {
            self.configuration = Some(settings.clone());
        }
        self
    }

    /// Names the worker thread.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Starts the worker thread.
    ///
    /// Modules are loaded and configured on the worker itself, ahead of any
    /// queued command.
    pub fn spawn(self) -> RuntimeResult<Interpreter> {
        let catalog = self.catalog.unwrap_or_else(ModuleCatalog::discover);
        let modules = self.modules.select(&catalog.names());

        let (sender, rx) = command_queue();
        let worker = Worker {
            registry: ModuleRegistry::new(catalog),
            conversation: Conversation::new(),
            router: Router::new(),
            ctx: ModuleContext::new(sender.clone(), self.sink),
            rx,
        };

        let configuration = self.configuration;
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || worker.run(&modules, configuration))?;

        info!(thread = %self.thread_name, "Interpreter spawned");

        Ok(Interpreter {
            sender,
            handle: Some(handle),
        })
    }
}

// =============================================================================
// Interpreter
// =============================================================================

/// Handle to a running interpreter.
///
/// Dropping the handle asks the worker to shut down without waiting for it;
/// call [`join`](Self::join) to wait.
pub struct Interpreter {
    sender: CommandSender,
    handle: Option<JoinHandle<()>>,
}

impl Interpreter {
    /// Returns a builder for a new interpreter.
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Enqueues a raw command.
    pub fn put_command(&self, raw: impl Into<String>) -> RuntimeResult<()> {
        Ok(self.sender.put_command(raw)?)
    }

    /// Enqueues a new configuration.
    pub fn set_configuration(&self, cfg: Value) -> RuntimeResult<()> {
        Ok(self.sender.set_configuration(cfg)?)
    }

    /// Enqueues the shutdown request.
    ///
    /// Items queued before it are still processed; items queued after it are
    /// dropped.
    pub fn stop(&self) -> RuntimeResult<()> {
        Ok(self.sender.stop()?)
    }

    /// A producer handle that can be moved to other threads or tasks.
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Returns `true` once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for the worker thread to exit.
    ///
    /// Does not request a shutdown by itself; call [`stop`](Self::stop)
    /// first.
    pub fn join(mut self) -> RuntimeResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        handle.join().map_err(|payload| {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            RuntimeError::WorkerPanicked(detail)
        })
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        if self.handle.is_some() {
            // The worker may already be gone.
            let _ = self.sender.stop();
        }
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Worker (internal)
// =============================================================================

struct Worker {
    registry: ModuleRegistry,
    conversation: Conversation,
    router: Router,
    ctx: ModuleContext,
    rx: CommandReceiver,
}

impl Worker {
    fn run(mut self, modules: &[String], configuration: Option<Value>) {
        info!(modules = modules.len(), "Interpreter worker started");

        self.registry.load(&self.ctx, modules);
        if let Some(cfg) = configuration {
            self.registry.configure(&self.ctx, cfg);
        }

        while let Some(item) = self.rx.blocking_next() {
            if !self.handle(item) {
                break;
            }
        }

        if self.conversation.abandon() {
            debug!("Shutting down with a conversation pending");
        }
        self.registry.destroy_all(&self.ctx);
        info!("Interpreter worker stopped");
    }

    /// Processes one queue item. Returns `false` once the worker must stop.
    fn handle(&mut self, item: QueueItem) -> bool {
        match item {
            QueueItem::Shutdown => {
                debug!("Shutdown requested");
                false
            }
            QueueItem::Configure(cfg) => {
                let _span = debug_span!("configure").entered();
                self.registry.configure(&self.ctx, cfg);
                true
            }
            QueueItem::Command(raw) => {
                let _span = debug_span!("command", raw = %raw).entered();
                let reply = self.process(&raw);
                debug!(tags = ?reply.tags, "Delivering reply");
                self.ctx.sink().add_reply(reply);
                true
            }
        }
    }

    /// Turns one raw command into its reply.
    fn process(&mut self, raw: &str) -> Reply {
        let tokens: Vec<String> = raw.split_whitespace().map(str::to_owned).collect();

        if tokens.first().is_some_and(|first| first == RELOAD_COMMAND) {
            self.conversation.abandon();
            let name = tokens[1..].join(" ");
            debug!(module = %name, "Reload requested");
            let message = self.registry.reload(&self.ctx, &name);
            return self.conversation.settle(message);
        }

        let message = match self.conversation.answer(&self.ctx, &tokens) {
            Some(message) => message,
            None => self
                .router
                .route(self.registry.commands(), &self.ctx, &tokens),
        };
        self.conversation.settle(message)
    }
}
