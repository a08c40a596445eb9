//! The template resolver.
//!
//! Resolves a push line's segments left to right, deciding segment by
//! segment whether to substitute a known local or to block on the completion
//! collaborator for a hole. The assembled text is what the dispatcher parses
//! and pushes onto the active block.

use weft_ir::{collaborator_error, undefined_variable, Segment, Template, WeftResult};

use crate::block::Entry;
use crate::completion::{CompletionClient, RetryPolicy};
use crate::environment::Locals;

/// Resolve `template` against `locals`, blocking on `client` for each hole.
///
/// Variable segments substitute a block's full rendering or a scalar's bare
/// text. For a hole, the context handed to the client is the active block's
/// rendering plus everything already resolved on this line; the raw
/// completion is bound to the hole's destination local and inlined into the
/// output.
pub(crate) fn resolve(
    template: &Template,
    locals: &mut Locals,
    client: &mut dyn CompletionClient,
    retry: RetryPolicy,
) -> WeftResult<String> {
    let mut out = String::new();
    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Variable(name) => match locals.get(name) {
                Some(Entry::Nested(block)) => out.push_str(&block.render()),
                Some(Entry::Scalar(value)) => out.push_str(&value.text()),
                None => return Err(undefined_variable(name.clone())),
            },
            Segment::Hole { dest, stops } => {
                let mut context = locals.active().render();
                context.push_str(&out);
                tracing::debug!(dest = %dest, context_len = context.len(), "resolving hole");
                let completion = retry
                    .complete(client, &context, stops.as_slice())
                    .map_err(|e| collaborator_error(e.message))?;
                locals.define(
                    dest,
                    Entry::Scalar(crate::value::Value::parse(&completion)),
                )?;
                out.push_str(&completion);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::completion::ScriptedClient;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn template(text: &str) -> Template {
        Template::parse(text).unwrap()
    }

    #[test]
    fn known_locals_resolve_without_a_collaborator_call() {
        let mut locals = Locals::new();
        locals
            .define("name", Entry::Scalar(Value::Line("World".to_string())))
            .unwrap();
        let mut client = ScriptedClient::new(Vec::<String>::new());
        let out = resolve(
            &template("Hello {name}!"),
            &mut locals,
            &mut client,
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(out, "Hello World!");
        assert!(client.requests().is_empty());
    }

    #[test]
    fn hole_context_is_active_block_plus_resolved_prefix() {
        let mut locals = Locals::new();
        locals
            .active_mut()
            .push(Entry::Scalar(Value::Line("earlier line".to_string())));
        let mut client = ScriptedClient::new(["Hi there"]);
        let out = resolve(
            &template("Say [greeting]"),
            &mut locals,
            &mut client,
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(out, "Say Hi there");
        assert_eq!(client.requests().len(), 1);
        assert_eq!(client.requests()[0].context, "earlier line\nSay ");
        assert_eq!(
            locals.get("greeting"),
            Some(&Entry::Scalar(Value::Line("Hi there".to_string())))
        );
    }

    #[test]
    fn later_holes_see_earlier_completions() {
        let mut locals = Locals::new();
        let mut client = ScriptedClient::new(["one", "two"]);
        let out = resolve(
            &template("[a] then [b]"),
            &mut locals,
            &mut client,
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(out, "one then two");
        assert_eq!(client.requests()[1].context, "one then ");
    }

    #[test]
    fn stop_tokens_reach_the_client() {
        let mut locals = Locals::new();
        let mut client = ScriptedClient::new(["x"]);
        resolve(
            &template("[v|*\\n|*Yes]"),
            &mut locals,
            &mut client,
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(
            client.requests()[0].stops,
            vec!["\n".to_string(), "Yes".to_string()]
        );
    }

    #[test]
    fn undefined_variable_is_fatal() {
        let mut locals = Locals::new();
        let mut client = ScriptedClient::new(Vec::<String>::new());
        let err = resolve(
            &template("{missing}"),
            &mut locals,
            &mut client,
            RetryPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err.message, "undefined variable: missing");
    }

    #[test]
    fn completion_failure_is_a_collaborator_error() {
        let mut locals = Locals::new();
        let mut client = ScriptedClient::new(Vec::<String>::new());
        let err = resolve(
            &template("[v]"),
            &mut locals,
            &mut client,
            RetryPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.message,
            "collaborator failed: scripted client ran out of replies"
        );
    }
}
