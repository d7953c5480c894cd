//! Command router.
//!
//! The [`Router`] hands a tokenized command to modules in ascending priority
//! order. For each module with a command tree:
//!
//! 1. Starting at the root, every token that names a child of the current
//!    branch is consumed and descended into.
//! 2. If descent stops on a branch, its default handler is used; without one
//!    the module does not match.
//! 3. The handler is called with the remaining tokens and their count.
//! 4. An [`Message::Empty`] result falls through to the next module; any
//!    other result is final.
//!
//! When no module answers, the router replies with [`NO_ANSWER`].

use tracing::{debug, trace};

use conch_core::{CommandNode, CommandTree, Handler, Message, ModuleContext, NO_ANSWER};

use crate::guard;

/// Finds the handler a command resolves to within one tree.
///
/// Returns the handler and the tokens left after descent, or `None` if the
/// tree does not match.
pub fn resolve<'t, 'a>(
    tree: &'t CommandTree,
    tokens: &'a [String],
) -> Option<(&'t Handler, &'a [String])> {
    let mut branch = tree.root();
    let mut rest = tokens;

    loop {
        let next = rest.first().and_then(|token| branch.child(token));
        match next {
            Some(CommandNode::Handler(handler)) => return Some((handler, &rest[1..])),
            Some(CommandNode::Branch(child)) => {
                branch = child;
                rest = &rest[1..];
            }
            None => return branch.default_handler().map(|handler| (handler, rest)),
        }
    }
}

/// Matches commands against the modules' command trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct Router;

impl Router {
    /// Creates a new router.
    pub fn new() -> Self {
        Self
    }

    /// Routes `tokens` through `modules`, which must already be in priority
    /// order.
    ///
    /// Never returns [`Message::Empty`]: a command nobody answers produces
    /// the default reply.
    pub fn route<'m, I>(&self, modules: I, ctx: &ModuleContext, tokens: &[String]) -> Message
    where
        I: IntoIterator<Item = (&'m str, &'m CommandTree)>,
    {
        for (module, tree) in modules {
            let Some((handler, rest)) = resolve(tree, tokens) else {
                trace!(module, "Command tree did not match, skipping");
                continue;
            };

            debug!(
                module,
                consumed = tokens.len() - rest.len(),
                remaining = rest.len(),
                "Command matched, invoking handler"
            );

            let result = guard::invoke(module, || handler(ctx, rest, rest.len()));
            if result.is_empty() {
                trace!(module, "Handler had no answer, falling through");
                continue;
            }
            return result;
        }

        debug!(tokens = ?tokens, "No module answered");
        Message::reply(NO_ANSWER)
    }
}
