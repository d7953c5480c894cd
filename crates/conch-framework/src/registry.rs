//! Module lifecycle management.
//!
//! [`ModuleRegistry`] owns every live module of an interpreter. It:
//!
//! - Instantiates modules from a [`ModuleCatalog`] and keeps them sorted by
//!   priority (stable, so equal priorities keep their load order).
//! - Drives the `initialize` / `configure` / `destroy` hooks. Every hook
//!   failure is isolated to the module that raised it: it is reported to the
//!   client as an error message and the remaining modules carry on.
//! - Remembers the last applied configuration so that a reloaded module is
//!   configured exactly like the instance it replaces.
//! - Replaces a single module in place on `reload`.
//!
//! The registry is owned by the worker thread and is never shared, so none of
//! this needs locking.
//!
//! ```text
//! load()    ──► Active   (initialize succeeded)
//!           ──► Failed   (initialize failed; still registered)
//! reload()  ──► create new ──► destroy old ──► Active | Failed
//!           ──► create failed ──► old instance kept
//! destroy_all() ──► (empty)
//! ```

use serde_json::Value;
use tracing::{debug, info, warn};

use conch_core::{
    CommandContractError, CommandTree, Message, Module, ModuleContext, ModuleError, ModuleResult,
};

use crate::catalog::ModuleCatalog;
use crate::guard;

/// Whether a registered module came up cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Every hook so far succeeded.
    Active,
    /// A hook failed. The module stays registered with whatever state it
    /// reached and keeps taking part in routing.
    Failed,
}

// =============================================================================
// ModuleEntry (internal)
// =============================================================================

struct ModuleEntry {
    name: String,
    priority: i32,
    module: Box<dyn Module>,
    tree: Option<CommandTree>,
    state: ModuleState,
}

impl ModuleEntry {
    fn new(name: &str, module: Box<dyn Module>) -> Self {
        Self {
            name: name.to_string(),
            priority: module.priority(),
            module,
            tree: None,
            state: ModuleState::Active,
        }
    }

    fn initialize(&mut self, ctx: &ModuleContext) -> ModuleResult<()> {
        let module = &mut self.module;
        guard::hook(|| module.initialize(ctx)).map_err(|cause| ModuleError::Init {
            module: self.name.clone(),
            cause,
        })
    }

    fn configure(&mut self, ctx: &ModuleContext, cfg: &Value) -> ModuleResult<()> {
        let module = &mut self.module;
        guard::hook(|| module.configure(ctx, cfg)).map_err(|cause| ModuleError::Config {
            module: self.name.clone(),
            cause,
        })
    }

    fn destroy(&mut self, ctx: &ModuleContext) {
        let module = &mut self.module;
        if let Err(cause) = guard::hook(|| module.destroy(ctx)) {
            let err = ModuleError::Destroy {
                module: self.name.clone(),
                cause,
            };
            warn!(module = %self.name, error = %err, "Module destroy hook failed");
        }
    }

    /// Re-reads the module's command tree.
    ///
    /// An invalid tree leaves the module without commands.
    fn refresh_tree(&mut self) -> ModuleResult<()> {
        self.tree = None;
        let node = guard::catch(|| self.module.commands()).map_err(|detail| {
            ModuleError::Contract {
                module: self.name.clone(),
                reason: CommandContractError::TreePanicked { detail },
            }
        })?;
        let Some(node) = node else {
            return Ok(());
        };
        let tree = CommandTree::try_from(node).map_err(|reason| ModuleError::Contract {
            module: self.name.clone(),
            reason,
        })?;
        self.tree = Some(tree);
        Ok(())
    }

    fn fail(&mut self, err: &ModuleError) {
        warn!(module = %self.name, error = %err, "Module entered failed state");
        self.state = ModuleState::Failed;
    }
}

// =============================================================================
// ModuleRegistry
// =============================================================================

/// The ordered set of live modules.
pub struct ModuleRegistry {
    catalog: ModuleCatalog,
    entries: Vec<ModuleEntry>,
    configuration: Option<Value>,
}

impl ModuleRegistry {
    /// Creates an empty registry drawing modules from `catalog`.
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self {
            catalog,
            entries: Vec::new(),
            configuration: None,
        }
    }

    /// The catalog modules are instantiated from.
    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// Loads and initializes the named modules.
    ///
    /// Modules are initialized in priority order. Every failure is delivered
    /// to the client through `ctx` and returned; it never stops the remaining
    /// modules from loading.
    pub fn load<I>(&mut self, ctx: &ModuleContext, names: I) -> Vec<ModuleError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut errors = Vec::new();
        let mut fresh: Vec<ModuleEntry> = Vec::new();

        for name in names {
            let name = name.as_ref();
            if self.contains(name) || fresh.iter().any(|e| e.name == name) {
                let err = ModuleError::Load {
                    module: name.to_string(),
                    cause: "module is already loaded".into(),
                };
                report(ctx, &err, format!("Error importing '{name}'"));
                errors.push(err);
                continue;
            }
            match self.catalog.instantiate(name) {
                Ok(module) => fresh.push(ModuleEntry::new(name, module)),
                Err(err) => {
                    report(ctx, &err, format!("Error importing '{name}'"));
                    errors.push(err);
                }
            }
        }

        fresh.sort_by_key(|e| e.priority);

        for entry in &mut fresh {
            debug!(module = %entry.name, priority = entry.priority, "Initializing module");
            if let Err(err) = entry.initialize(ctx) {
                entry.fail(&err);
                report(ctx, &err, format!("Error initializing '{}'", entry.name));
                errors.push(err);
            }
            if let Err(err) = entry.refresh_tree() {
                entry.fail(&err);
                report(ctx, &err, format!("Error initializing '{}'", entry.name));
                errors.push(err);
            }
        }

        let loaded = fresh.len();
        self.entries.extend(fresh);
        self.sort();

        info!(
            loaded,
            failed = errors.len(),
            total = self.entries.len(),
            "Modules loaded"
        );
        errors
    }

    /// Loads every module of the catalog.
    pub fn load_all(&mut self, ctx: &ModuleContext) -> Vec<ModuleError> {
        let names = self.catalog.names();
        self.load(ctx, names)
    }

    /// Applies a new configuration to the client and every module.
    ///
    /// The configuration must be a JSON object; anything else is logged and
    /// ignored. Its `"window"` member goes to the reply sink, the whole
    /// object to every module's `configure` hook.
    pub fn configure(&mut self, ctx: &ModuleContext, cfg: Value) -> Vec<ModuleError> {
        if !cfg.is_object() {
            warn!(configuration = %cfg, "Got invalid configuration, ignoring");
            return Vec::new();
        }

        let cfg = self.configuration.insert(cfg);
        ctx.sink().set_configuration(cfg.get("window"));

        let mut errors = Vec::new();
        for entry in &mut self.entries {
            let result = entry
                .configure(ctx, cfg)
                .and_then(|()| entry.refresh_tree());
            if let Err(err) = result {
                entry.fail(&err);
                report(
                    ctx,
                    &err,
                    format!("Error updating configuration for '{}'", entry.name),
                );
                errors.push(err);
            }
        }

        debug!(
            modules = self.entries.len(),
            failed = errors.len(),
            "Configuration applied"
        );
        errors
    }

    /// The last configuration applied by [`configure`](Self::configure).
    pub fn configuration(&self) -> Option<&Value> {
        self.configuration.as_ref()
    }

    /// Replaces the named module with a fresh instance.
    ///
    /// A registered module is re-created first; only once that succeeded is
    /// the old instance destroyed and the new one initialized and configured
    /// with the last known configuration. If the new instance cannot be
    /// created the old one stays in place untouched.
    ///
    /// A known but unregistered module is created and initialized only, and
    /// is registered only if that succeeded. No other module is touched.
    ///
    /// Returns the reply for the user: a confirmation or an error message
    /// naming the step that failed.
    pub fn reload(&mut self, ctx: &ModuleContext, name: &str) -> Message {
        let Some(index) = self.entries.iter().position(|e| e.name == name) else {
            return self.import(ctx, name);
        };

        let module = match self.catalog.instantiate(name) {
            Ok(module) => module,
            Err(err) => {
                warn!(module = name, error = %err, "Reload failed, keeping the running instance");
                return Message::error(err.into_reload(), format!("Error reloading '{name}'"));
            }
        };

        let mut old = self.entries.remove(index);
        debug!(module = %old.name, "Destroying module for reload");
        old.destroy(ctx);

        let mut entry = ModuleEntry::new(name, module);
        let outcome = self.start(ctx, &mut entry, true);
        if let Err((err, _)) = &outcome {
            entry.fail(err);
        }

        self.entries.insert(index, entry);
        self.sort();

        match outcome {
            Ok(()) => reloaded(name),
            Err((err, context)) => Message::error(err.into_reload(), context),
        }
    }

    /// Reload of a module that is not registered yet.
    fn import(&mut self, ctx: &ModuleContext, name: &str) -> Message {
        let context = format!("Error importing module '{name}'");
        let mut entry = match self.catalog.instantiate(name) {
            Ok(module) => ModuleEntry::new(name, module),
            Err(err) => return Message::error(err.into_reload(), context),
        };

        if let Err((err, _)) = self.start(ctx, &mut entry, false) {
            warn!(module = name, error = %err, "Module not registered");
            return Message::error(err.into_reload(), context);
        }

        self.entries.push(entry);
        self.sort();
        reloaded(name)
    }

    /// Runs the hooks a reloaded module goes through.
    fn start(
        &self,
        ctx: &ModuleContext,
        entry: &mut ModuleEntry,
        configure: bool,
    ) -> Result<(), (ModuleError, String)> {
        let init_context = format!("Error initializing module '{}'", entry.name);

        entry
            .initialize(ctx)
            .map_err(|err| (err, init_context.clone()))?;
        if configure && let Some(cfg) = &self.configuration {
            entry
                .configure(ctx, cfg)
                .map_err(|err| (err, "Error updating configuration".to_string()))?;
        }
        entry.refresh_tree().map_err(|err| (err, init_context))
    }

    /// Calls every module's `destroy` hook and empties the registry.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn destroy_all(&mut self, ctx: &ModuleContext) {
        let count = self.entries.len();
        for mut entry in self.entries.drain(..) {
            debug!(module = %entry.name, "Destroying module");
            entry.destroy(ctx);
        }
        info!(count, "All modules destroyed");
    }

    /// Command trees in routing order, paired with their module's name.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &CommandTree)> {
        self.entries
            .iter()
            .filter_map(|e| e.tree.as_ref().map(|tree| (e.name.as_str(), tree)))
    }

    /// Registered module names in routing order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Returns the state of the named module, if registered.
    pub fn state(&self, name: &str) -> Option<ModuleState> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.state)
    }

    /// Returns `true` if a module named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no module is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort(&mut self) {
        self.entries.sort_by_key(|e| e.priority);
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .field("configured", &self.configuration.is_some())
            .finish()
    }
}

fn reloaded(name: &str) -> Message {
    info!(module = name, "Module reloaded");
    Message::reply(format!(
        "Module '{name}' reloaded (all related settings were reset)"
    ))
}

/// Delivers a module failure to the client.
fn report(ctx: &ModuleContext, err: &ModuleError, context: String) {
    warn!(module = %err.module(), error = %err, "{context}");
    ctx.notify(Message::error(err.to_string(), context).to_reply());
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use conch_core::{Branch, BoxError, CommandNode, Reply, ReplySink, command_queue};

    #[derive(Default)]
    struct Hooks {
        init: AtomicUsize,
        config: AtomicUsize,
        destroy: AtomicUsize,
    }

    impl Hooks {
        fn counts(&self) -> (usize, usize, usize) {
            (
                self.init.load(Ordering::SeqCst),
                self.config.load(Ordering::SeqCst),
                self.destroy.load(Ordering::SeqCst),
            )
        }
    }

    #[derive(Clone)]
    struct Tracked {
        name: &'static str,
        priority: i32,
        hooks: Arc<Hooks>,
        fail_init: bool,
        panic_init: bool,
        fail_config: bool,
        root_default: bool,
    }

    impl Tracked {
        fn new(name: &'static str, priority: i32) -> Self {
            Self {
                name,
                priority,
                hooks: Arc::new(Hooks::default()),
                fail_init: false,
                panic_init: false,
                fail_config: false,
                root_default: false,
            }
        }
    }

    impl Module for Tracked {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn commands(&self) -> Option<CommandNode> {
            let name = self.name;
            let mut root = Branch::new().handler(name, move |_, _, _| Ok(Message::reply(name)));
            if self.root_default {
                root = root.default(|_, _, _| Ok(Message::Empty));
            }
            Some(root.into())
        }

        fn initialize(&mut self, _ctx: &ModuleContext) -> Result<(), BoxError> {
            self.hooks.init.fetch_add(1, Ordering::SeqCst);
            if self.panic_init {
                panic!("init blew up");
            }
            if self.fail_init {
                return Err("init exploded".into());
            }
            Ok(())
        }

        fn configure(&mut self, _ctx: &ModuleContext, _cfg: &Value) -> Result<(), BoxError> {
            self.hooks.config.fetch_add(1, Ordering::SeqCst);
            if self.fail_config {
                return Err("bad settings".into());
            }
            Ok(())
        }

        fn destroy(&mut self, _ctx: &ModuleContext) -> Result<(), BoxError> {
            self.hooks.destroy.fetch_add(1, Ordering::SeqCst);
            Err("destroy always complains".into())
        }
    }

    #[derive(Default)]
    struct Recorder {
        replies: Mutex<Vec<Reply>>,
        windows: Mutex<Vec<Option<Value>>>,
    }

    impl ReplySink for Recorder {
        fn add_reply(&self, reply: Reply) {
            self.replies.lock().push(reply);
        }

        fn set_configuration(&self, window: Option<&Value>) {
            self.windows.lock().push(window.cloned());
        }
    }

    fn setup(modules: &[Tracked]) -> (ModuleRegistry, ModuleContext, Arc<Recorder>) {
        let mut catalog = ModuleCatalog::new();
        for module in modules {
            let module = module.clone();
            catalog.register(module.name, move || Ok(Box::new(module.clone())));
        }
        let recorder = Arc::new(Recorder::default());
        let (sender, _rx) = command_queue();
        let ctx = ModuleContext::new(sender, recorder.clone());
        (ModuleRegistry::new(catalog), ctx, recorder)
    }

    fn reply_text(msg: &Message) -> String {
        msg.to_reply().text
    }

    #[test]
    fn test_load_sorts_by_priority_stably() {
        let modules = [
            Tracked::new("late", 10),
            Tracked::new("first_tie", 5),
            Tracked::new("second_tie", 5),
        ];
        let (mut registry, ctx, _) = setup(&modules);

        let errors = registry.load_all(&ctx);

        assert!(errors.is_empty());
        assert_eq!(registry.names(), vec!["first_tie", "second_tie", "late"]);
        let routed: Vec<&str> = registry.commands().map(|(name, _)| name).collect();
        assert_eq!(routed, vec!["first_tie", "second_tie", "late"]);
    }

    #[test]
    fn test_init_failure_is_isolated() {
        let mut broken = Tracked::new("broken", 1);
        broken.fail_init = true;
        let healthy = Tracked::new("healthy", 2);
        let (mut registry, ctx, recorder) = setup(&[broken, healthy.clone()]);

        let errors = registry.load_all(&ctx);

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ModuleError::Init { ref module, .. } if module == "broken"));
        assert_eq!(registry.state("broken"), Some(ModuleState::Failed));
        assert_eq!(registry.state("healthy"), Some(ModuleState::Active));
        assert_eq!(healthy.hooks.counts(), (1, 0, 0));

        let replies = recorder.replies.lock();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].is_error());
        assert!(replies[0].text.starts_with("Error initializing 'broken'"));
    }

    #[test]
    fn test_init_panic_is_isolated() {
        let mut panicky = Tracked::new("panicky", 0);
        panicky.panic_init = true;
        let healthy = Tracked::new("healthy", 1);
        let (mut registry, ctx, recorder) = setup(&[panicky, healthy.clone()]);

        let errors = registry.load_all(&ctx);

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ModuleError::Init { ref module, .. } if module == "panicky"));
        assert!(errors[0].to_string().contains("init blew up"));
        assert_eq!(registry.state("panicky"), Some(ModuleState::Failed));
        assert_eq!(registry.state("healthy"), Some(ModuleState::Active));
        assert_eq!(healthy.hooks.counts(), (1, 0, 0));
        assert!(registry.commands().any(|(name, _)| name == "healthy"));
        assert!(
            recorder.replies.lock()[0]
                .text
                .starts_with("Error initializing 'panicky'")
        );
    }

    #[test]
    fn test_panicking_command_tree_is_contract_error() {
        struct Unbuildable;

        impl Module for Unbuildable {
            fn name(&self) -> &str {
                "unbuildable"
            }

            fn priority(&self) -> i32 {
                0
            }

            fn commands(&self) -> Option<CommandNode> {
                panic!("no tree today")
            }
        }

        let catalog = ModuleCatalog::new().with("unbuildable", || Ok(Box::new(Unbuildable)));
        let (sender, _rx) = command_queue();
        let ctx = ModuleContext::new(sender, Arc::new(Recorder::default()));
        let mut registry = ModuleRegistry::new(catalog);

        let errors = registry.load_all(&ctx);

        assert!(matches!(
            errors[0],
            ModuleError::Contract {
                reason: CommandContractError::TreePanicked { .. },
                ..
            }
        ));
        assert_eq!(registry.state("unbuildable"), Some(ModuleState::Failed));
        assert_eq!(registry.commands().count(), 0);
    }

    #[test]
    fn test_unknown_and_duplicate_names() {
        let (mut registry, ctx, recorder) = setup(&[Tracked::new("a", 0)]);

        let errors = registry.load(&ctx, ["a", "ghost", "a"]);

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ModuleError::Load { .. })));
        assert_eq!(registry.names(), vec!["a"]);
        assert_eq!(recorder.replies.lock().len(), 2);
    }

    #[test]
    fn test_root_default_is_contract_error() {
        let mut rogue = Tracked::new("rogue", 0);
        rogue.root_default = true;
        let (mut registry, ctx, _) = setup(&[rogue]);

        let errors = registry.load_all(&ctx);

        assert!(matches!(errors[0], ModuleError::Contract { .. }));
        assert_eq!(registry.commands().count(), 0);
        assert!(registry.contains("rogue"));
    }

    #[test]
    fn test_configure_reaches_every_module_and_window() {
        let a = Tracked::new("a", 0);
        let mut b = Tracked::new("b", 1);
        b.fail_config = true;
        let (mut registry, ctx, recorder) = setup(&[a.clone(), b.clone()]);
        registry.load_all(&ctx);

        let errors = registry.configure(&ctx, json!({ "window": { "width": 80 }, "volume": 3 }));

        assert_eq!(errors.len(), 1);
        assert_eq!(a.hooks.counts(), (1, 1, 0));
        assert_eq!(b.hooks.counts(), (1, 1, 0));
        assert_eq!(registry.state("b"), Some(ModuleState::Failed));
        assert_eq!(
            recorder.windows.lock().as_slice(),
            &[Some(json!({ "width": 80 }))]
        );
        assert!(
            recorder.replies.lock()[0]
                .text
                .starts_with("Error updating configuration for 'b'")
        );
        assert_eq!(registry.configuration(), Some(&json!({ "window": { "width": 80 }, "volume": 3 })));
    }

    #[test]
    fn test_non_object_configuration_is_ignored() {
        let a = Tracked::new("a", 0);
        let (mut registry, ctx, recorder) = setup(&[a.clone()]);
        registry.load_all(&ctx);

        let errors = registry.configure(&ctx, json!([1, 2, 3]));

        assert!(errors.is_empty());
        assert_eq!(a.hooks.counts(), (1, 0, 0));
        assert!(registry.configuration().is_none());
        assert!(recorder.windows.lock().is_empty());
    }

    #[test]
    fn test_reload_touches_only_target() {
        let x = Tracked::new("x", 0);
        let y = Tracked::new("y", 1);
        let (mut registry, ctx, _) = setup(&[x.clone(), y.clone()]);
        registry.load_all(&ctx);
        registry.configure(&ctx, json!({}));

        let msg = registry.reload(&ctx, "x");

        assert_eq!(
            reply_text(&msg),
            "Module 'x' reloaded (all related settings were reset)"
        );
        assert_eq!(x.hooks.counts(), (2, 2, 1));
        assert_eq!(y.hooks.counts(), (1, 1, 0));
        assert_eq!(registry.names(), vec!["x", "y"]);
    }

    #[test]
    fn test_reload_without_configuration_skips_configure() {
        let x = Tracked::new("x", 0);
        let (mut registry, ctx, _) = setup(&[x.clone()]);
        registry.load_all(&ctx);

        registry.reload(&ctx, "x");

        assert_eq!(x.hooks.counts(), (2, 0, 1));
    }

    #[test]
    fn test_reload_unregistered_initializes_only() {
        let fresh = Tracked::new("fresh", 3);
        let (mut registry, ctx, _) = setup(&[fresh.clone()]);
        registry.configure(&ctx, json!({ "k": 1 }));

        let msg = registry.reload(&ctx, "fresh");

        assert!(!msg.is_error());
        assert_eq!(fresh.hooks.counts(), (1, 0, 0));
        assert!(registry.contains("fresh"));
    }

    #[test]
    fn test_reload_unknown_module() {
        let (mut registry, ctx, _) = setup(&[]);

        let msg = registry.reload(&ctx, "nowhere");

        let reply = msg.to_reply();
        assert!(reply.is_error());
        assert!(reply.text.starts_with("Error importing module 'nowhere'"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reload_keeps_running_instance_when_creation_fails() {
        let x = Tracked::new("x", 0);
        let broken = Arc::new(AtomicBool::new(false));
        let template = x.clone();
        let factory_broken = Arc::clone(&broken);
        let catalog = ModuleCatalog::new().with("x", move || {
            if factory_broken.load(Ordering::SeqCst) {
                return Err("syntax error".into());
            }
            Ok(Box::new(template.clone()))
        });
        let (sender, _rx) = command_queue();
        let ctx = ModuleContext::new(sender, Arc::new(Recorder::default()));
        let mut registry = ModuleRegistry::new(catalog);
        registry.load_all(&ctx);
        registry.configure(&ctx, json!({}));

        broken.store(true, Ordering::SeqCst);
        let msg = registry.reload(&ctx, "x");

        assert!(msg.to_reply().text.starts_with("Error reloading 'x'"));
        assert_eq!(registry.state("x"), Some(ModuleState::Active));
        assert_eq!(registry.commands().count(), 1);
        assert_eq!(x.hooks.counts(), (1, 1, 0));

        // Still registered, so a later reload configures the new instance
        broken.store(false, Ordering::SeqCst);
        let msg = registry.reload(&ctx, "x");
        assert!(!msg.is_error());
        assert_eq!(x.hooks.counts(), (2, 2, 1));
    }

    #[test]
    fn test_reload_unregistered_init_failure_is_not_registered() {
        let mut fresh = Tracked::new("fresh", 0);
        fresh.fail_init = true;
        let (mut registry, ctx, _) = setup(&[fresh.clone()]);

        let msg = registry.reload(&ctx, "fresh");

        assert!(msg.to_reply().text.starts_with("Error importing module 'fresh'"));
        assert!(!registry.contains("fresh"));
        assert_eq!(fresh.hooks.counts(), (1, 0, 0));
    }

    #[test]
    fn test_reload_config_failure_reports_step() {
        let mut x = Tracked::new("x", 0);
        x.fail_config = true;
        let (mut registry, ctx, _) = setup(&[x.clone()]);
        registry.load_all(&ctx);
        registry.configure(&ctx, json!({}));

        let msg = registry.reload(&ctx, "x");

        assert!(msg.to_reply().text.starts_with("Error updating configuration"));
        match msg {
            Message::Error { cause, .. } => {
                let err = cause.downcast_ref::<ModuleError>().unwrap();
                assert!(matches!(err, ModuleError::Reload { module, .. } if module == "x"));
            }
            other => panic!("expected an error, got {other:?}"),
        }
        assert_eq!(registry.state("x"), Some(ModuleState::Failed));
    }

    #[test]
    fn test_reload_keeps_position_among_equal_priorities() {
        let modules = [Tracked::new("a", 1), Tracked::new("b", 1), Tracked::new("c", 1)];
        let (mut registry, ctx, _) = setup(&modules);
        registry.load_all(&ctx);

        registry.reload(&ctx, "b");

        assert_eq!(registry.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_destroy_all_calls_every_hook_once() {
        let a = Tracked::new("a", 0);
        let b = Tracked::new("b", 1);
        let (mut registry, ctx, recorder) = setup(&[a.clone(), b.clone()]);
        registry.load_all(&ctx);

        registry.destroy_all(&ctx);

        assert_eq!(a.hooks.counts().2, 1);
        assert_eq!(b.hooks.counts().2, 1);
        assert!(registry.is_empty());
        assert!(recorder.replies.lock().is_empty());
    }
}
