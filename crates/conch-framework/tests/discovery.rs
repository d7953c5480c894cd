//! Modules exported with `export_module!` are found by `ModuleCatalog::discover`.

use std::sync::Arc;

use conch_core::{
    Branch, CommandNode, MODULES, Message, Module, ModuleContext, NullSink, command_queue,
    export_module,
};
use conch_framework::{ModuleCatalog, ModuleRegistry, Router};

struct Lantern {
    lit: bool,
}

impl Module for Lantern {
    fn name(&self) -> &str {
        "lantern"
    }

    fn priority(&self) -> i32 {
        5
    }

    fn commands(&self) -> Option<CommandNode> {
        let state = if self.lit { "lit" } else { "dark" };
        Some(
            Branch::new()
                .handler("lantern", move |_, _, _| Ok(Message::reply(state)))
                .into(),
        )
    }
}

export_module!(LANTERN, "lantern", || Ok(Box::new(Lantern { lit: true })));

struct Beacon;

impl Module for Beacon {
    fn name(&self) -> &str {
        "beacon"
    }

    fn priority(&self) -> i32 {
        1
    }
}

export_module!(BEACON, "beacon", || Ok(Box::new(Beacon)));

#[test]
fn test_exported_modules_are_in_the_slice() {
    let names: Vec<&str> = MODULES.iter().map(|d| d.name).collect();
    assert!(names.contains(&"lantern"));
    assert!(names.contains(&"beacon"));
}

#[test]
fn test_discover_finds_and_instantiates_exported_modules() {
    let catalog = ModuleCatalog::discover();

    assert!(catalog.contains("lantern"));
    assert!(catalog.contains("beacon"));
    // Discovery orders by name
    let names = catalog.names();
    let beacon = names.iter().position(|n| n == "beacon").unwrap();
    let lantern = names.iter().position(|n| n == "lantern").unwrap();
    assert!(beacon < lantern);

    let module = catalog.instantiate("lantern").unwrap();
    assert_eq!(module.name(), "lantern");
    assert_eq!(module.priority(), 5);
}

#[test]
fn test_discovered_module_routes_commands() {
    let (sender, _rx) = command_queue();
    let ctx = ModuleContext::new(sender, Arc::new(NullSink));
    let mut registry = ModuleRegistry::new(ModuleCatalog::discover());

    let errors = registry.load_all(&ctx);
    assert!(errors.is_empty());

    let tokens = vec!["lantern".to_string()];
    let reply = Router::new()
        .route(registry.commands(), &ctx, &tokens)
        .to_reply();
    assert_eq!(reply.text, "lit");
}
