#![cfg(feature = "macros")]

use parley::{CancellationToken, Dispatcher, Invocation, Outcome, ParameterFlags};

mod common;
use common::content;

/// Roll some dice.
#[parley::command(aliases = ["r", "dice"])]
async fn roll(count: u32, sides: Option<u32>) -> String {
    format!("{count}d{}", sides.unwrap_or(6))
}

#[parley::command(name = "say")]
async fn say_command(#[rest] text: String) -> String {
    text
}

#[parley::command]
async fn whoami(inv: Invocation, loud: Option<bool>) -> String {
    let name = inv.path.as_str().to_owned();
    if loud.unwrap_or(false) {
        name.to_uppercase()
    } else {
        name
    }
}

#[test]
fn test_declaration_shape() {
    let command = roll::command().unwrap();
    assert_eq!(roll::NAME, "roll");
    assert_eq!(command.name().as_str(), "roll");
    assert_eq!(command.segments()[0].aliases().len(), 2);

    let parameters = command.parameters();
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].name(), "count");
    assert!(!parameters[0].is_optional());
    assert_eq!(parameters[1].name(), "sides");
    assert!(parameters[1].is_optional());

    let say = say_command::command().unwrap();
    assert_eq!(say.name().as_str(), "say");
    assert_eq!(say.parameters()[0].flags(), ParameterFlags::REMAINDER);

    // the invocation is not a formal parameter
    assert_eq!(whoami::command().unwrap().parameters().len(), 1);
}

#[tokio::test]
async fn test_generated_handlers_dispatch() {
    let dispatcher = Dispatcher::builder()
        .commands([
            roll::command().unwrap(),
            say_command::command().unwrap(),
            whoami::command().unwrap(),
        ])
        .build();
    let cancel = CancellationToken::new();

    let outcome = dispatcher.execute("dice 2 20", &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("2d20"));

    let outcome = dispatcher.execute("R 3", &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("3d6"));

    let outcome = dispatcher.execute("say hello   there", &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("hello   there"));

    let outcome = dispatcher.execute("WhoAmI true", &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("WHOAMI"));

    assert!(matches!(
        dispatcher.execute("roll many", &cancel).await.unwrap(),
        Outcome::NoMatchingOverload { .. }
    ));
}
