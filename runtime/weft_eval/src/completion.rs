//! The completion collaborator boundary.
//!
//! Hole resolution suspends the dispatcher on a single blocking
//! `complete(context, stops)` call. The client behind that call is
//! injectable, and so is the retry policy: retry is an explicit strategy at
//! this boundary rather than an implicit absence of one. Network transports
//! live downstream; this crate ships a scripted test double and an
//! interactive console stand-in.

use std::collections::VecDeque;
use std::io::Write;

/// Failure reported by a completion client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionError {
    pub message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> CompletionError {
        CompletionError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CompletionError {}

/// A blocking text-completion backend.
///
/// `context` is the full prompt text accumulated so far; `stops` are the
/// stop sequences the backend should truncate at. The call is synchronous
/// and strictly sequential with respect to the instruction stream.
pub trait CompletionClient {
    fn complete(&mut self, context: &str, stops: &[String]) -> Result<String, CompletionError>;
}

/// Retry strategy applied around every completion call.
///
/// The default is a single attempt; a failure after the last attempt
/// propagates to the dispatcher as a fatal collaborator error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
}

impl RetryPolicy {
    /// A policy making exactly `attempts` tries (minimum one).
    pub fn attempts(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts: attempts.max(1),
        }
    }

    /// Run `client.complete` under this policy.
    pub fn complete(
        &self,
        client: &mut dyn CompletionClient,
        context: &str,
        stops: &[String],
    ) -> Result<String, CompletionError> {
        let mut last = CompletionError::new("no completion attempt made");
        for attempt in 1..=self.attempts {
            match client.complete(context, stops) {
                Ok(text) => return Ok(text),
                Err(err) => {
                    tracing::debug!(attempt, error = %err, "completion attempt failed");
                    last = err;
                }
            }
        }
        Err(last)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::attempts(1)
    }
}

/// One recorded completion request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub context: String,
    pub stops: Vec<String>,
}

/// Test double: replies from a fixed queue and records every request.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    replies: VecDeque<String>,
    requests: Vec<Request>,
}

impl ScriptedClient {
    /// A client that will answer with `replies`, in order.
    pub fn new(replies: impl IntoIterator<Item = impl Into<String>>) -> ScriptedClient {
        ScriptedClient {
            replies: replies.into_iter().map(Into::into).collect(),
            requests: Vec::new(),
        }
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }
}

impl CompletionClient for ScriptedClient {
    fn complete(&mut self, context: &str, stops: &[String]) -> Result<String, CompletionError> {
        self.requests.push(Request {
            context: context.to_string(),
            stops: stops.to_vec(),
        });
        self.replies
            .pop_front()
            .ok_or_else(|| CompletionError::new("scripted client ran out of replies"))
    }
}

/// Interactive stand-in: prints the context and reads one line from stdin.
#[derive(Debug, Default)]
pub struct ConsoleClient;

impl CompletionClient for ConsoleClient {
    fn complete(&mut self, context: &str, _stops: &[String]) -> Result<String, CompletionError> {
        print!("{context}");
        std::io::stdout()
            .flush()
            .map_err(|e| CompletionError::new(e.to_string()))?;
        let mut reply = String::new();
        std::io::stdin()
            .read_line(&mut reply)
            .map_err(|e| CompletionError::new(e.to_string()))?;
        Ok(reply.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// A client that always fails; the builder default until one is injected.
#[derive(Debug, Default)]
pub struct UnconfiguredClient;

impl CompletionClient for UnconfiguredClient {
    fn complete(&mut self, _context: &str, _stops: &[String]) -> Result<String, CompletionError> {
        Err(CompletionError::new("no completion client configured"))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scripted_client_replies_in_order_and_records() {
        let mut client = ScriptedClient::new(["first", "second"]);
        let stops = vec!["\n".to_string()];
        assert_eq!(client.complete("a", &stops).unwrap(), "first");
        assert_eq!(client.complete("b", &[]).unwrap(), "second");
        assert!(client.complete("c", &[]).is_err());
        assert_eq!(client.requests().len(), 3);
        assert_eq!(client.requests()[0].context, "a");
        assert_eq!(client.requests()[0].stops, stops);
    }

    struct FlakyClient {
        failures_left: u32,
    }

    impl CompletionClient for FlakyClient {
        fn complete(&mut self, _: &str, _: &[String]) -> Result<String, CompletionError> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(CompletionError::new("transient"));
            }
            Ok("ok".to_string())
        }
    }

    #[test]
    fn retry_policy_reasks_up_to_its_attempt_count() {
        let mut client = FlakyClient { failures_left: 2 };
        let policy = RetryPolicy::attempts(3);
        assert_eq!(policy.complete(&mut client, "x", &[]).unwrap(), "ok");

        let mut client = FlakyClient { failures_left: 2 };
        let policy = RetryPolicy::attempts(2);
        assert!(policy.complete(&mut client, "x", &[]).is_err());
    }

    #[test]
    fn default_policy_is_a_single_attempt() {
        assert_eq!(RetryPolicy::default(), RetryPolicy::attempts(1));
        assert_eq!(RetryPolicy::attempts(0), RetryPolicy::attempts(1));
    }
}
