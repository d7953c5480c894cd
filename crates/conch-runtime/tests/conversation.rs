//! Multi-step dialogs through a running interpreter.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use conch_core::{Answer, Branch, Choice, HandlerResult, Message, ModuleContext, NO_ANSWER, tags};

use common::{TestModule, run, spawn};

type Seen = Arc<Mutex<Vec<(Vec<String>, usize)>>>;

fn second_step(
    seen: Seen,
) -> impl Fn(&ModuleContext, Answer<'_>) -> HandlerResult + Send + Sync + 'static {
    move |_, answer| {
        seen.lock().push((answer.tokens.to_vec(), answer.count));
        let first = answer.arg("first").and_then(|v| v.as_str()).unwrap_or_default();
        Ok(Message::reply(format!("{first} then {}", answer.text())))
    }
}

fn two_step(seen: Seen) -> TestModule {
    TestModule::new("survey", 0).with_commands(move || {
        let seen = Arc::clone(&seen);
        Branch::new().handler("survey", move |_, _, _| {
            let seen = Arc::clone(&seen);
            Ok(Message::question("Q1", move |_, answer| {
                seen.lock().push((answer.tokens.to_vec(), answer.count));
                Ok(Message::question("Q2", second_step(Arc::clone(&seen)))
                    .with_arg("first", answer.text()))
            }))
        })
    })
}

fn ping() -> TestModule {
    TestModule::new("ping", 10)
        .with_commands(|| Branch::new().handler("ping", |_, _, _| Ok(Message::reply("pong"))))
}

#[test]
fn test_two_step_dialog() {
    let seen: Seen = Arc::default();
    let (interpreter, recorder) = spawn(&[two_step(Arc::clone(&seen)), ping()]);

    run(interpreter, &["survey", "answer1", "ping   pong", "ping"]);

    let replies = recorder.replies();
    assert_eq!(replies[0].text, "Q1");
    assert!(replies[0].has_tag(tags::QUESTION));
    assert_eq!(replies[1].text, "Q2");
    assert!(replies[1].has_tag(tags::QUESTION));
    // The answers never reach the router, even when they look like commands
    assert_eq!(replies[2].text, "answer1 then ping pong");
    assert_eq!(replies[3].text, "pong");

    assert_eq!(
        *seen.lock(),
        vec![
            (vec!["answer1".to_string()], 1),
            (vec!["ping".to_string(), "pong".to_string()], 2),
        ]
    );
}

#[test]
fn test_dialog_ends_on_error_and_empty() {
    let module = TestModule::new("ask", 0).with_commands(|| {
        Branch::new()
            .handler("fail", |_, _, _| {
                Ok(Message::question("?", |_, _| Err("cannot parse".into())))
            })
            .handler("shrug", |_, _, _| Ok(Message::question("?", |_, _| Ok(Message::Empty))))
            .handler("ping", |_, _, _| Ok(Message::reply("pong")))
    });

    let (interpreter, recorder) = spawn(&[module]);
    run(interpreter, &["fail", "x", "ping", "shrug", "x", "ping"]);

    assert_eq!(
        recorder.texts(),
        vec![
            "?",
            "Error parsing command: cannot parse",
            "pong",
            "?",
            NO_ANSWER,
            "pong",
        ]
    );
}

#[test]
fn test_question_exposes_prefilled_text() {
    let module = TestModule::new("rename", 0).with_commands(|| {
        Branch::new().handler("rename", |_, _, _| {
            Ok(
                Message::question("New name?", |_, answer| Ok(Message::reply(answer.text())))
                    .with_arg("text", "old-name"),
            )
        })
    });

    let (interpreter, recorder) = spawn(&[module]);
    run(interpreter, &["rename", "new-name"]);

    let replies = recorder.replies();
    assert_eq!(replies[0].extra, json!({ "text": "old-name" }));
    assert_eq!(replies[1].text, "new-name");
}

fn picker() -> TestModule {
    TestModule::new("pick", 0).with_commands(|| {
        Branch::new().handler("pick", |_, _, _| {
            Ok(Message::select(
                "Pick a color",
                |_, answer| match answer.choice() {
                    Some(choice) => Ok(Message::reply(format!(
                        "{} ({})",
                        choice.label, choice.payload
                    ))),
                    None => Ok(answer.reprompt_with(format!(
                        "'{}' is not an option. Pick a color",
                        answer.text()
                    ))),
                },
                vec![Choice::new("red", "#f00"), Choice::new("green", "#0f0")],
            ))
        })
    })
}

#[test]
fn test_select_reprompts_on_invalid_answer() {
    let (interpreter, recorder) = spawn(&[picker(), ping()]);
    run(interpreter, &["pick", "purple", "9", "green", "ping"]);

    let replies = recorder.replies();
    assert_eq!(replies[0].text, "Pick a color\n 1. red\n 2. green");
    assert!(replies[0].has_tag(tags::SELECT));
    assert_eq!(replies[0].extra, json!({ "choices": ["red", "green"] }));

    assert!(replies[1].has_tag(tags::SELECT));
    assert!(replies[1].text.starts_with("'purple' is not an option"));
    assert!(replies[2].has_tag(tags::SELECT));

    assert_eq!(replies[3].text, "green (\"#0f0\")");
    assert_eq!(replies[4].text, "pong");
}

#[test]
fn test_select_accepts_index() {
    let (interpreter, recorder) = spawn(&[picker()]);
    run(interpreter, &["pick", "1"]);

    assert_eq!(recorder.texts()[1], "red (\"#f00\")");
}

#[test]
fn test_reload_abandons_pending_dialog() {
    let (interpreter, recorder) = spawn(&[picker(), ping()]);
    run(interpreter, &["pick", "reload ping", "ping", "red"]);

    let texts = recorder.texts();
    assert_eq!(texts[1], "Module 'ping' reloaded (all related settings were reset)");
    // The dialog is gone: both inputs are routed as commands
    assert_eq!(texts[2], "pong");
    assert_eq!(texts[3], NO_ANSWER);
}
