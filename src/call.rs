use pest::Parser;

use crate::ast::Literal;
use crate::error::{ParseError, Result};
use crate::parser::{LiteralGrammar, Rule};
use crate::processor::ArgParser;

/// A method invocation as written in a template, e.g. `slow_action(1, 'two')`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub name: String,
    pub args: Vec<Literal>,
}

impl MethodCall {
    /// Parse a call spec with the default [`ArgParser`].
    pub fn parse(spec: &str) -> Result<Self> {
        Self::parse_with(&ArgParser::new(), spec)
    }

    /// Parse a call spec, handing the text between the parentheses to
    /// `parser`. Parentheses are optional: `reset` is a call with no
    /// arguments.
    pub fn parse_with(parser: &ArgParser, spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let invalid = |reason: String| ParseError::InvalidCall {
            spec: spec.to_owned(),
            reason,
        };

        let mut pairs = LiteralGrammar::parse(Rule::call_spec, spec)
            .map_err(|e| invalid(e.variant.message().into_owned()))?;
        let Some(call) = pairs.next() else {
            return Err(invalid("empty call".to_string()));
        };

        let mut name = None;
        let mut args = Vec::new();
        for part in call.into_inner() {
            match part.as_rule() {
                Rule::method_name => name = Some(part.as_str().to_owned()),
                Rule::call_args => args = parser.parse(part.as_str())?,
                _ => {}
            }
        }

        let name = name.ok_or_else(|| invalid("missing method name".to_string()))?;
        tracing::debug!(method = %name, args = args.len(), "parsed method call");
        Ok(MethodCall { name, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_with_args() {
        let call = MethodCall::parse("slow_action(1, 'two', {'a': 3})").unwrap();
        assert_eq!(call.name, "slow_action");
        assert_eq!(
            call.args,
            vec![
                Literal::Int(1),
                Literal::String("two".to_string()),
                Literal::Map(vec![(Literal::String("a".to_string()), Literal::Int(3))]),
            ]
        );
    }

    #[test]
    fn test_call_without_parentheses() {
        let call = MethodCall::parse("  slow_action ").unwrap();
        assert_eq!(call.name, "slow_action");
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_call_with_empty_parentheses() {
        let call = MethodCall::parse("refresh()").unwrap();
        assert_eq!(call.name, "refresh");
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_special_and_dotted_names() {
        assert_eq!(MethodCall::parse("$reset").unwrap().name, "$reset");
        assert_eq!(
            MethodCall::parse("$parent.save('x')").unwrap().name,
            "$parent.save"
        );
    }

    #[test]
    fn test_parenthesis_inside_argument() {
        let call = MethodCall::parse("log(')', (1, 2))").unwrap();
        assert_eq!(
            call.args,
            vec![
                Literal::String(")".to_string()),
                Literal::Tuple(vec![Literal::Int(1), Literal::Int(2)]),
            ]
        );
    }

    #[test]
    fn test_invalid_call() {
        assert!(matches!(
            MethodCall::parse("1abc()").unwrap_err(),
            ParseError::InvalidCall { .. }
        ));
        assert!(matches!(
            MethodCall::parse("go(1").unwrap_err(),
            ParseError::InvalidCall { .. }
        ));
    }

    #[test]
    fn test_argument_errors_propagate() {
        assert!(matches!(
            MethodCall::parse("go([1, 2)").unwrap_err(),
            ParseError::UnclosedBracket { bracket: '[', offset: 0 }
        ));
    }
}
