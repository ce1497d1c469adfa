//! Procedural macros for Parley.
//!
//! - `#[command]` - Attribute macro turning an `async fn` with typed
//!   parameters into a `Handler` plus its `Command` declaration

use proc_macro::TokenStream;

mod command;

/// Declare a command from an `async fn`.
///
/// Every parameter becomes a formal parameter named after its binding:
///
/// - `T` is required,
/// - `Option<T>` is optional,
/// - `#[rest] T` takes the rest of the input and must come last,
/// - a parameter of type `Invocation` receives the invocation itself
///   (cancellation, services, path) and is not bound from input.
///
/// The function is replaced by a unit struct of the same name implementing
/// `Handler`, with a `command()` constructor for the declaration.
///
/// ```rust,ignore
/// #[parley::command(name = "roll", aliases = ["r", "dice"])]
/// async fn roll(count: u32, sides: Option<u32>) -> String {
///     format!("{count}d{}", sides.unwrap_or(6))
/// }
///
/// let declaration = roll::command()?;
/// ```
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::command_impl(attr, item)
}
