//! Invocation boundary for module code: handlers, continuations, lifecycle
//! hooks and factories. Nothing a module does may unwind into the worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use conch_core::{BoxError, CommandContractError, HandlerResult, Message};

/// Context attached to errors returned by handlers.
pub const HANDLER_ERROR_CONTEXT: &str = "Error parsing command";

/// Context attached to handlers that produced no message at all.
pub const INVALID_RESPONSE_CONTEXT: &str = "Invalid response from command";

/// Runs a handler or continuation and turns every failure into a message.
///
/// An `Err` becomes an error message; a panic is a contract violation and
/// becomes an error message as well, so the worker keeps running.
pub fn invoke(command: &str, call: impl FnOnce() -> HandlerResult) -> Message {
    match catch(call) {
        Ok(Ok(message)) => message,
        Ok(Err(cause)) => {
            debug!(command, error = %cause, "Command returned an error");
            Message::error(cause, HANDLER_ERROR_CONTEXT)
        }
        Err(detail) => {
            error!(command, detail = %detail, "Command panicked instead of answering");
            Message::error(
                CommandContractError::InvalidResponse {
                    command: command.to_string(),
                    detail,
                },
                INVALID_RESPONSE_CONTEXT,
            )
        }
    }
}

/// Runs a lifecycle hook or factory. A panic becomes an ordinary hook error.
pub fn hook<T>(call: impl FnOnce() -> Result<T, BoxError>) -> Result<T, BoxError> {
    catch(call).unwrap_or_else(|detail| {
        error!(detail = %detail, "Module hook panicked");
        Err(format!("panicked: {detail}").into())
    })
}

/// Runs `call`, returning the panic message if it unwinds.
pub fn catch<T>(call: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| panic_detail(payload.as_ref()))
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
