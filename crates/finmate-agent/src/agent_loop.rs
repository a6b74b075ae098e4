//! Bounded tool-calling chat loop
//!
//! Each run works like this:
//! 1. Send the working messages and the tool catalog to the completion client
//! 2. Append the assistant reply
//! 3. No tool calls: return the reply text
//! 4. Otherwise dispatch every call in order, append one tool message per call
//!    and go again, at most [`MAX_TURNS`] times

use async_trait::async_trait;
use chrono::Local;
use finmate_llm::{
    CompletionClient, CompletionRequest, LLMError, Message, StopReason, TokenUsage, ToolCall,
};
use finmate_tools::{ToolOutput, ToolRegistry};
use finmate_utils::preview;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::context::ContextAssembler;
use crate::prompts::chat_system_prompt;

/// Completion calls allowed per run
pub const MAX_TURNS: usize = 3;

/// Reply used when the budget runs out before the model produced any text
pub const STILL_THINKING: &str =
    "I'm still working through this one. Please ask again or narrow the question.";

const PREVIEW_CHARS: usize = 200;

/// One chat query with its ambient context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,

    /// Assembled context block (portfolio, news, documents)
    #[serde(default)]
    pub context: String,

    /// Prior turns; windowed before use
    #[serde(default)]
    pub history: Vec<Message>,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopOutcome {
    /// The model answered without requesting tools
    Completed,
    /// Every turn requested tools
    BudgetExhausted,
    /// The completion client failed; `content` carries the detail
    ClientError,
}

/// Result of one run
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    /// User-visible answer
    pub content: String,
    pub outcome: LoopOutcome,
    /// Completion calls made
    pub turns: usize,
    /// Final working sequence
    #[serde(skip)]
    pub messages: Vec<Message>,
    /// Token usage summed over all turns
    #[serde(skip)]
    pub usage: TokenUsage,
}

/// Callbacks fired while a run progresses
///
/// Useful for showing tool activity to a user while the loop runs.
#[async_trait]
pub trait LoopObserver: Send + Sync {
    /// Called before a tool call is dispatched
    async fn on_tool_start(&self, _call: &ToolCall) {}

    /// Called after a tool call produced its result text
    async fn on_tool_done(&self, _call: &ToolCall, _output: &ToolOutput, _elapsed: Duration) {}

    /// Called once with the final reply
    async fn on_complete(&self, _reply: &ChatReply) {}
}

/// Observer that ignores every event
pub struct NoOpObserver;

#[async_trait]
impl LoopObserver for NoOpObserver {}

/// Text shown to the user when the completion client fails
pub fn client_error_message(error: &LLMError) -> String {
    format!(
        "I encountered an error while communicating with the AI service.\n\nError details: {error}"
    )
}

/// Drives the bounded chat loop against a completion client
pub struct AgentLoop {
    client: Arc<dyn CompletionClient>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    observer: Option<Arc<dyn LoopObserver>>,
}

impl AgentLoop {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            client,
            tools,
            config,
            observer: None,
        }
    }

    /// Set the observer used by [`AgentLoop::run`]
    pub fn with_observer(mut self, observer: Arc<dyn LoopObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answer one query
    pub async fn run(&self, request: ChatRequest) -> ChatReply {
        let observer = self
            .observer
            .clone()
            .unwrap_or_else(|| Arc::new(NoOpObserver));
        self.run_with_observer(request, observer).await
    }

    /// Answer one query, reporting progress to a per-request observer
    pub async fn run_with_observer(
        &self,
        request: ChatRequest,
        observer: Arc<dyn LoopObserver>,
    ) -> ChatReply {
        let today = Local::now().format("%Y-%m-%d").to_string();
        let history = ContextAssembler::window_history(&request.history);

        let mut messages = Vec::with_capacity(history.len() + 2 + MAX_TURNS * 2);
        messages.push(Message::system(chat_system_prompt(&request.context, &today)));
        messages.extend(history);
        messages.push(Message::user(request.query));

        let tools = self.tools.definitions();
        let mut usage = TokenUsage::default();
        let mut last_text = String::new();

        for turn in 1..=MAX_TURNS {
            info!(
                turn = turn,
                max_turns = MAX_TURNS,
                model = %self.config.model,
                message_count = messages.len(),
                "Chat turn started"
            );

            let completion = CompletionRequest::builder(&self.config.model)
                .messages(messages.clone())
                .max_tokens(self.config.max_tokens)
                .temperature(self.config.chat_temperature)
                .tools(tools.clone())
                .build();

            let response = match self.client.complete(completion).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        turn = turn,
                        client = self.client.name(),
                        error = %e,
                        "Completion failed, aborting run"
                    );
                    let reply = ChatReply {
                        content: client_error_message(&e),
                        outcome: LoopOutcome::ClientError,
                        turns: turn,
                        messages,
                        usage,
                    };
                    return finish(reply, observer.as_ref()).await;
                }
            };

            usage += response.usage;
            info!(
                turn = turn,
                stop_reason = ?response.stop_reason,
                tool_calls = response.message.tool_calls.len(),
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Completion received"
            );
            if response.stop_reason == StopReason::MaxTokens {
                warn!(turn = turn, "Completion hit the token limit");
            }
            debug!(
                response_preview = %preview(response.message.text(), PREVIEW_CHARS),
                "Assistant text"
            );

            let assistant = response.message;
            last_text = assistant.text().to_string();
            let calls = assistant.tool_calls.clone();
            messages.push(assistant);

            if calls.is_empty() {
                let reply = ChatReply {
                    content: last_text,
                    outcome: LoopOutcome::Completed,
                    turns: turn,
                    messages,
                    usage,
                };
                return finish(reply, observer.as_ref()).await;
            }

            for call in &calls {
                observer.on_tool_start(call).await;

                let started = Instant::now();
                let output = self.tools.dispatch(call).await;
                let elapsed = started.elapsed();

                info!(
                    tool = %call.name,
                    call_id = %call.id,
                    duration_ms = elapsed.as_millis() as u64,
                    is_error = output.is_error,
                    result_length = output.content.len(),
                    "Tool call answered"
                );
                observer.on_tool_done(call, &output, elapsed).await;

                messages.push(Message::tool_result(call.id.clone(), output.content));
            }
        }

        warn!(max_turns = MAX_TURNS, "Turn budget exhausted without a final answer");
        let content = if last_text.trim().is_empty() {
            STILL_THINKING.to_string()
        } else {
            last_text
        };
        let reply = ChatReply {
            content,
            outcome: LoopOutcome::BudgetExhausted,
            turns: MAX_TURNS,
            messages,
            usage,
        };
        finish(reply, observer.as_ref()).await
    }
}

async fn finish(reply: ChatReply, observer: &dyn LoopObserver) -> ChatReply {
    info!(
        outcome = ?reply.outcome,
        turns = reply.turns,
        total_tokens = reply.usage.total(),
        response_length = reply.content.len(),
        "Chat run finished"
    );
    observer.on_complete(&reply).await;
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        ScriptedClient, StubSearch, offline_registry, registry, text_reply, tool_reply,
    };
    use finmate_llm::Role;
    use finmate_tools::SearchHit;
    use serde_json::json;
    use std::sync::Mutex;

    fn agent(client: Arc<ScriptedClient>) -> AgentLoop {
        AgentLoop::new(client, offline_registry(), AgentConfig::default())
    }

    fn tool_messages(messages: &[Message]) -> Vec<&Message> {
        messages.iter().filter(|m| m.role == Role::Tool).collect()
    }

    #[tokio::test]
    async fn test_single_turn_returns_text_verbatim() {
        let client = Arc::new(ScriptedClient::new(vec![text_reply(
            "  Your portfolio is mostly tech.\n",
        )]));
        let request =
            ChatRequest::new("Summarize my portfolio").with_context("Portfolio: AAPL, MSFT");

        let reply = agent(client.clone()).run(request).await;

        assert_eq!(reply.content, "  Your portfolio is mostly tech.\n");
        assert_eq!(reply.outcome, LoopOutcome::Completed);
        assert_eq!(reply.turns, 1);
        assert_eq!(client.calls(), 1);

        let requests = client.requests();
        let sent = &requests[0];
        assert_eq!(sent.tools.as_ref().map(Vec::len), Some(4));
        assert_eq!(sent.messages[0].role, Role::System);
        assert!(sent.messages[0].text().contains("Portfolio: AAPL, MSFT"));
        assert_eq!(sent.messages.last().unwrap().text(), "Summarize my portfolio");
    }

    #[tokio::test]
    async fn test_rsi_question_end_to_end() {
        let call = ToolCall::with_json(
            "call_rsi",
            "get_technical_indicators",
            &json!({ "ticker": "TSLA" }),
        );
        let final_text = "TSLA's 14-day RSI is above 70, so it looks overbought.";
        let client = Arc::new(ScriptedClient::new(vec![
            tool_reply("", vec![call]),
            text_reply(final_text),
        ]));

        let reply = agent(client.clone()).run(ChatRequest::new("What's the RSI on TSLA?")).await;

        assert_eq!(reply.content, final_text);
        assert_eq!(reply.outcome, LoopOutcome::Completed);
        assert_eq!(client.calls(), 2);

        let requests = client.requests();
        let second = &requests[1];
        let tool_msg = second.messages.last().unwrap();
        assert_eq!(tool_msg.role, Role::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_rsi"));

        let payload: serde_json::Value = serde_json::from_str(tool_msg.text()).unwrap();
        assert_eq!(payload["ticker"], "TSLA");
        assert_eq!(payload["signal"], "Overbought");
        assert!(payload["rsi_14"].as_f64().unwrap() > 70.0);

        // the tool-call turn stays in the sequence right before its result
        let assistant = &second.messages[second.messages.len() - 2];
        assert_eq!(assistant.role, Role::Assistant);
        assert!(assistant.has_tool_calls());
    }

    #[tokio::test]
    async fn test_tool_results_follow_call_order() {
        let calls = vec![
            ToolCall::new("c1", "delete_portfolio", "{}"),
            ToolCall::with_json("c2", "get_stock_price", &json!({ "ticker": "aapl" })),
            ToolCall::with_json("c3", "search_web", &json!({ "query": "apple earnings" })),
            ToolCall::new("c4", "get_fundamentals", "{\"ticker\":"),
        ];
        let client = Arc::new(ScriptedClient::new(vec![
            tool_reply("Let me check.", calls.clone()),
            text_reply("Done."),
        ]));

        let reply = agent(client.clone()).run(ChatRequest::new("How is Apple doing?")).await;
        assert_eq!(reply.content, "Done.");

        let results = tool_messages(&reply.messages);
        assert_eq!(results.len(), calls.len());
        for (result, call) in results.iter().zip(&calls) {
            assert_eq!(result.tool_call_id.as_deref(), Some(call.id.as_str()));
        }

        assert_eq!(results[0].text(), "Unknown tool: delete_portfolio");
        assert!(results[1].text().contains("\"ticker\":\"AAPL\""));
        assert!(results[2].text().starts_with("Error:"));
        assert!(results[3].text().starts_with("Invalid arguments for get_fundamentals"));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_placeholder() {
        let client = Arc::new(ScriptedClient::repeating(|| {
            tool_reply(
                "",
                vec![ToolCall::with_json("again", "get_stock_price", &json!({ "ticker": "NVDA" }))],
            )
        }));

        let reply = agent(client.clone()).run(ChatRequest::new("Keep checking NVDA")).await;

        assert_eq!(reply.content, STILL_THINKING);
        assert_eq!(reply.outcome, LoopOutcome::BudgetExhausted);
        assert_eq!(reply.turns, MAX_TURNS);
        assert_eq!(client.calls(), MAX_TURNS);
        // system + user + (assistant + tool) per turn
        assert_eq!(reply.messages.len(), 2 + MAX_TURNS * 2);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_keeps_last_text() {
        let client = Arc::new(ScriptedClient::repeating(|| {
            tool_reply(
                "Price so far looks flat.",
                vec![ToolCall::with_json("again", "get_stock_price", &json!({ "ticker": "NVDA" }))],
            )
        }));

        let reply = agent(client.clone()).run(ChatRequest::new("Keep checking NVDA")).await;

        assert_eq!(reply.content, "Price so far looks flat.");
        assert_eq!(reply.outcome, LoopOutcome::BudgetExhausted);
        assert_eq!(client.calls(), MAX_TURNS);
    }

    #[tokio::test]
    async fn test_client_error_aborts_without_retry() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_reply(
                "",
                vec![ToolCall::with_json("c1", "get_stock_price", &json!({ "ticker": "MSFT" }))],
            ),
            Err(LLMError::RateLimitExceeded("slow down".to_string())),
            text_reply("never reached"),
        ]));

        let reply = agent(client.clone()).run(ChatRequest::new("MSFT price?")).await;

        assert_eq!(reply.outcome, LoopOutcome::ClientError);
        assert_eq!(reply.turns, 2);
        assert_eq!(client.calls(), 2);
        assert!(
            reply
                .content
                .starts_with("I encountered an error while communicating with the AI service.")
        );
        assert!(reply.content.contains("Rate limit exceeded: slow down"));
    }

    #[tokio::test]
    async fn test_history_is_windowed() {
        let history: Vec<Message> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("q{i}"))
                } else {
                    Message::assistant(format!("a{i}"))
                }
            })
            .collect();
        let client = Arc::new(ScriptedClient::new(vec![text_reply("ok")]));

        agent(client.clone())
            .run(ChatRequest::new("next").with_history(history))
            .await;

        let requests = client.requests();
        let sent = &requests[0].messages;
        assert_eq!(sent.len(), 1 + 6 + 1);
        assert_eq!(sent[1].text(), "q4");
        assert_eq!(sent[6].text(), "a9");
    }

    #[tokio::test]
    async fn test_prior_reply_messages_reused_as_history() {
        let call = ToolCall::with_json("call_px", "get_stock_price", &json!({ "ticker": "AAPL" }));
        let client = Arc::new(ScriptedClient::new(vec![
            tool_reply("", vec![call]),
            text_reply("AAPL is 101."),
            text_reply("Still 101."),
        ]));
        let agent = agent(client.clone());

        let first = agent.run(ChatRequest::new("AAPL price?")).await;
        assert_eq!(first.outcome, LoopOutcome::Completed);

        let second = agent
            .run(ChatRequest::new("and now?").with_history(first.messages))
            .await;
        assert_eq!(second.content, "Still 101.");

        let requests = client.requests();
        let sent = &requests[2].messages;
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0].role, Role::System);
        assert_eq!(sent[1], Message::user("AAPL price?"));
        assert_eq!(sent[2], Message::assistant("AAPL is 101."));
        assert_eq!(sent[3], Message::user("and now?"));
        assert!(sent.iter().all(|m| !m.has_tool_calls() && m.role != Role::Tool));
    }

    #[tokio::test]
    async fn test_observer_sees_tool_activity() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<String>>);

        #[async_trait]
        impl LoopObserver for Recorder {
            async fn on_tool_start(&self, call: &ToolCall) {
                self.0.lock().unwrap().push(format!("start {}", call.name));
            }
            async fn on_tool_done(&self, call: &ToolCall, output: &ToolOutput, _elapsed: Duration) {
                self.0.lock().unwrap().push(format!("done {} {}", call.name, output.is_error));
            }
            async fn on_complete(&self, reply: &ChatReply) {
                self.0.lock().unwrap().push(format!("complete {:?}", reply.outcome));
            }
        }

        let search = StubSearch {
            hits: Some(vec![SearchHit {
                title: "Fed holds".into(),
                link: "https://news.example/fed".into(),
                snippet: "Rates unchanged".into(),
            }]),
        };
        let client = Arc::new(ScriptedClient::new(vec![
            tool_reply(
                "",
                vec![ToolCall::with_json("s1", "search_web", &json!({ "query": "fed" }))],
            ),
            text_reply("The Fed held rates."),
        ]));
        let recorder = Arc::new(Recorder::default());

        let reply = AgentLoop::new(client, registry(search), AgentConfig::default())
            .with_observer(recorder.clone())
            .run(ChatRequest::new("Any Fed news?"))
            .await;

        assert_eq!(reply.usage.total(), 30);
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["start search_web", "done search_web false", "complete Completed"]
        );
    }

    #[test]
    fn test_reply_envelope() {
        let reply = ChatReply {
            content: "hi".into(),
            outcome: LoopOutcome::BudgetExhausted,
            turns: 3,
            messages: vec![Message::user("x")],
            usage: TokenUsage::default(),
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "content": "hi", "outcome": "budget_exhausted", "turns": 3 })
        );
    }
}
