//! Shared helpers for the interpreter integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use conch_core::{BoxError, Branch, CommandNode, Module, ModuleContext, Reply, ReplySink};
use conch_framework::ModuleCatalog;
use conch_runtime::Interpreter;

/// A sink recording every reply and client configuration.
#[derive(Default)]
pub struct Recorder {
    replies: Mutex<Vec<Reply>>,
    windows: Mutex<Vec<Option<Value>>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.replies.lock().iter().map(|r| r.text.clone()).collect()
    }

    pub fn windows(&self) -> Vec<Option<Value>> {
        self.windows.lock().clone()
    }
}

impl ReplySink for Recorder {
    fn add_reply(&self, reply: Reply) {
        self.replies.lock().push(reply);
    }

    fn set_configuration(&self, window: Option<&Value>) {
        self.windows.lock().push(window.cloned());
    }
}

/// How often each lifecycle hook of a module ran, across all instances.
#[derive(Default)]
pub struct Hooks {
    pub init: AtomicUsize,
    pub config: AtomicUsize,
    pub destroy: AtomicUsize,
}

impl Hooks {
    /// `(initialize, configure, destroy)` call counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.init.load(Ordering::SeqCst),
            self.config.load(Ordering::SeqCst),
            self.destroy.load(Ordering::SeqCst),
        )
    }
}

type TreeFn = Arc<dyn Fn() -> Branch + Send + Sync>;

/// A module whose command tree is given by a closure and whose hooks are counted.
#[derive(Clone)]
pub struct TestModule {
    pub name: &'static str,
    pub priority: i32,
    pub hooks: Arc<Hooks>,
    tree: Option<TreeFn>,
    init_panic: Option<&'static str>,
}

impl TestModule {
    pub fn new(name: &'static str, priority: i32) -> Self {
        Self {
            name,
            priority,
            hooks: Arc::new(Hooks::default()),
            tree: None,
            init_panic: None,
        }
    }

    pub fn with_commands<F>(mut self, tree: F) -> Self
    where
        F: Fn() -> Branch + Send + Sync + 'static,
    {
        self.tree = Some(Arc::new(tree));
        self
    }

    /// Makes `initialize` panic with `message`.
    pub fn panicking_init(mut self, message: &'static str) -> Self {
        self.init_panic = Some(message);
        self
    }
}

impl Module for TestModule {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn commands(&self) -> Option<CommandNode> {
        self.tree.as_ref().map(|tree| tree().into())
    }

    fn initialize(&mut self, _ctx: &ModuleContext) -> Result<(), BoxError> {
        self.hooks.init.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.init_panic {
            panic!("{message}");
        }
        Ok(())
    }

    fn configure(&mut self, _ctx: &ModuleContext, _cfg: &Value) -> Result<(), BoxError> {
        self.hooks.config.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn destroy(&mut self, _ctx: &ModuleContext) -> Result<(), BoxError> {
        self.hooks.destroy.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A catalog creating a fresh clone of each module on every instantiation.
pub fn catalog(modules: &[TestModule]) -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    for module in modules {
        let module = module.clone();
        catalog.register(module.name, move || Ok(Box::new(module.clone())));
    }
    catalog
}

/// Spawns an interpreter over `modules` recording into a fresh sink.
pub fn spawn(modules: &[TestModule]) -> (Interpreter, Arc<Recorder>) {
    let recorder = Recorder::new();
    let interpreter = Interpreter::builder()
        .catalog(catalog(modules))
        .shared_sink(recorder.clone())
        .spawn()
        .unwrap();
    (interpreter, recorder)
}

/// Feeds `commands`, stops the interpreter and waits for it.
pub fn run(interpreter: Interpreter, commands: &[&str]) {
    for command in commands {
        interpreter.put_command(*command).unwrap();
    }
    interpreter.stop().unwrap();
    interpreter.join().unwrap();
}
