use parley::{
    Binder, BinderRegistry, CancellationToken, Command, Dispatcher, FnBinder, Group, Invocation,
    NumberStyle, Outcome, Overrides, Parameter, ParameterOverride, Reply, UuidFormat,
    binders::{NumericBinder, StringBinder},
};
use uuid::Uuid;

mod common;
use common::content;

fn which(label: &'static str, parameters: Vec<Parameter>) -> Command {
    let mut builder = Command::builder("a");
    for parameter in parameters {
        builder = builder.parameter(parameter);
    }
    builder
        .handler(move |_: Invocation| async move { Reply::text(label) })
        .build()
        .unwrap()
}

#[test]
fn test_builtin_binders() {
    let int = NumericBinder::<i32>::new();
    assert_eq!(int.bind("123", &Overrides::new()), Some(123));
    assert_eq!(int.bind("abc", &Overrides::new()), None);
    assert_eq!(
        StringBinder.bind("\"hi\"", &Overrides::new()).as_deref(),
        Some("hi")
    );
}

#[tokio::test]
async fn test_more_specific_path_wins_before_fallback() {
    let nested = Group::new("a")
        .command(
            Command::builder("b")
                .parameter(Parameter::of::<i32>("n"))
                .handler(|_: Invocation| async { Reply::text("a b") })
                .build()
                .unwrap(),
        )
        .flatten()
        .unwrap();
    let mut commands = nested;
    commands.push(which("a", vec![Parameter::of::<String>("rest").remainder()]));
    let dispatcher = Dispatcher::builder().commands(commands).build();
    let cancel = CancellationToken::new();

    let outcome = dispatcher.execute("a b 1", &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("a b"));

    // `1x` is not an i32, so `a b` is rejected and `a` takes the rest
    let outcome = dispatcher.execute("a b 1x", &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("a"));
}

#[tokio::test]
async fn test_overloads_by_parameter_count_and_type() {
    let dispatcher = Dispatcher::builder()
        .commands([
            which("none", vec![]),
            which("int", vec![Parameter::of::<i64>("n")]),
            which("bool", vec![Parameter::of::<bool>("flag")]),
            which(
                "pair",
                vec![Parameter::of::<i64>("x"), Parameter::of::<i64>("y")],
            ),
        ])
        .build();
    let cancel = CancellationToken::new();

    let answer = |outcome: Outcome| content(&outcome).map(str::to_owned);
    assert_eq!(answer(dispatcher.execute("a", &cancel).await.unwrap()).as_deref(), Some("none"));
    assert_eq!(answer(dispatcher.execute("a 5", &cancel).await.unwrap()).as_deref(), Some("int"));
    assert_eq!(answer(dispatcher.execute("A TRUE", &cancel).await.unwrap()).as_deref(), Some("bool"));
    assert_eq!(answer(dispatcher.execute("a 1 2", &cancel).await.unwrap()).as_deref(), Some("pair"));
    assert!(matches!(
        dispatcher.execute("a 1 2 3", &cancel).await.unwrap(),
        Outcome::NoMatchingOverload { candidates: 4, .. }
    ));
}

#[tokio::test]
async fn test_overrides_change_binding() {
    let dispatcher = Dispatcher::builder()
        .commands([
            Command::builder("color")
                .parameter(
                    Parameter::of::<u32>("rgb")
                        .with_override(ParameterOverride::NumberStyle(NumberStyle::HEX_NUMBER)),
                )
                .handler(|mut inv: Invocation| async move {
                    let rgb: u32 = inv.arguments.require("rgb")?;
                    Ok::<_, parley::ArgumentError>(format!("{rgb}"))
                })
                .build()
                .unwrap(),
            Command::builder("user")
                .parameter(
                    Parameter::of::<Uuid>("id")
                        .with_override(ParameterOverride::UuidFormat(UuidFormat::Braced)),
                )
                .handler(|mut inv: Invocation| async move {
                    let id: Uuid = inv.arguments.require("id")?;
                    Ok::<_, parley::ArgumentError>(id.simple().to_string())
                })
                .build()
                .unwrap(),
        ])
        .build();
    let cancel = CancellationToken::new();

    let outcome = dispatcher.execute("color ff8000", &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("16744448"));

    let braced = "{67e55044-10b1-426f-9247-bb680e5fe0c8}";
    let outcome = dispatcher.execute(format!("user {braced}"), &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("67e5504410b1426f9247bb680e5fe0c8"));

    let hyphenated = "67e55044-10b1-426f-9247-bb680e5fe0c8";
    assert!(matches!(
        dispatcher.execute(format!("user {hyphenated}"), &cancel).await.unwrap(),
        Outcome::NoMatchingOverload { .. }
    ));
}

#[derive(Debug, PartialEq)]
struct Coordinate(i32, i32);

#[tokio::test]
async fn test_custom_binder_registry() {
    let binders = BinderRegistry::builder()
        .binder(FnBinder::new(|text: &str, _: &Overrides| {
            let (x, y) = text.split_once(',')?;
            Some(Coordinate(x.parse().ok()?, y.parse().ok()?))
        }))
        .build();
    let dispatcher = Dispatcher::builder()
        .binders(binders)
        .commands([Command::builder("goto")
            .parameter(Parameter::of::<Coordinate>("at"))
            .handler(|mut inv: Invocation| async move {
                let at: Coordinate = inv.arguments.require("at")?;
                Ok::<_, parley::ArgumentError>(format!("{} {}", at.0, at.1))
            })
            .build()
            .unwrap()])
        .build();
    let cancel = CancellationToken::new();

    let outcome = dispatcher.execute("goto 3,-4", &cancel).await.unwrap();
    assert_eq!(content(&outcome), Some("3 -4"));
    assert!(matches!(
        dispatcher.execute("goto north", &cancel).await.unwrap(),
        Outcome::NoMatchingOverload { .. }
    ));
}
