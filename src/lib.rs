//! Parse the argument list of a template method call, such as the
//! `1, 'two', {'a': 3}` in `slow_action(1, 'two', {'a': 3})`, into typed
//! values, and dispatch such calls against server-held components.
//!
//! ```
//! use callargs::{Literal, parse_args};
//!
//! let args = parse_args("1, [2, '3']").unwrap();
//! assert_eq!(
//!     args,
//!     vec![
//!         Literal::Int(1),
//!         Literal::List(vec![Literal::Int(2), Literal::String("3".into())]),
//!     ]
//! );
//! ```

pub mod ast;
pub mod call;
pub mod dispatch;
pub mod error;
pub mod parser;
pub mod processor;
pub mod splitter;

pub use ast::Literal;
pub use call::MethodCall;
pub use dispatch::{CallOutcome, Component, Dispatcher};
pub use error::{DispatchError, ParseError, Result};
pub use processor::{ArgParser, ParseOptions};

/// Parse a comma-separated argument list with default options.
pub fn parse_args(input: &str) -> Result<Vec<Literal>> {
    ArgParser::new().parse(input)
}

/// Parse a full call spec like `name(args)`.
pub fn parse_call(spec: &str) -> Result<MethodCall> {
    MethodCall::parse(spec)
}
