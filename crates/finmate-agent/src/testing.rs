//! Scripted completion client and stub backends for unit tests

use async_trait::async_trait;
use chrono::Utc;
use finmate_llm::{
    CompletionClient, CompletionRequest, CompletionResponse, LLMError, Message, StopReason,
    TokenUsage, ToolCall,
};
use finmate_tools::{
    Fundamentals, MarketData, Quote, SearchHit, ToolError, ToolRegistry, ToolsConfig, WebSearch,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Reply = finmate_llm::Result<CompletionResponse>;

/// Completion client that replays scripted replies and records every request
pub struct ScriptedClient {
    script: Mutex<VecDeque<Reply>>,
    repeat: Option<Box<dyn Fn() -> Reply + Send + Sync>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    /// Replay `replies` in order; fails once they run out
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with a fresh reply from `make`
    pub fn repeating(make: impl Fn() -> Reply + Send + Sync + 'static) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Some(Box::new(make)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> finmate_llm::Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(reply) = self.script.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.repeat {
            Some(make) => make(),
            None => Err(LLMError::UnexpectedResponse("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn usage() -> TokenUsage {
    TokenUsage {
        input_tokens: 10,
        output_tokens: 5,
    }
}

/// Final assistant text
pub fn text_reply(text: &str) -> Reply {
    Ok(CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: usage(),
    })
}

/// Assistant turn requesting tool calls
pub fn tool_reply(text: &str, calls: Vec<ToolCall>) -> Reply {
    Ok(CompletionResponse {
        message: Message::assistant_with_tool_calls(text, calls),
        stop_reason: StopReason::ToolUse,
        usage: usage(),
    })
}

/// Market data stub: rising daily closes, a fixed quote, no fundamentals
pub struct StubMarket;

#[async_trait]
impl MarketData for StubMarket {
    async fn quote(&self, ticker: &str) -> finmate_tools::Result<Quote> {
        Ok(Quote {
            ticker: ticker.to_string(),
            price: 101.0,
            previous_close: Some(100.0),
            timestamp: Utc::now(),
        })
    }

    async fn daily_closes(&self, _ticker: &str, _range: &str) -> finmate_tools::Result<Vec<f64>> {
        Ok((1..=80).map(f64::from).collect())
    }

    async fn fundamentals(&self, ticker: &str) -> finmate_tools::Result<Fundamentals> {
        Err(ToolError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: "no overview".to_string(),
        })
    }
}

/// Web search stub returning fixed hits, or failing when `hits` is `None`
pub struct StubSearch {
    pub hits: Option<Vec<SearchHit>>,
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> finmate_tools::Result<Vec<SearchHit>> {
        self.hits
            .clone()
            .ok_or_else(|| ToolError::SearchError("search backend offline".to_string()))
    }
}

pub fn registry(search: StubSearch) -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::new(
        ToolsConfig::default(),
        Arc::new(StubMarket),
        Arc::new(search),
    ))
}

pub fn offline_registry() -> Arc<ToolRegistry> {
    registry(StubSearch { hits: None })
}
