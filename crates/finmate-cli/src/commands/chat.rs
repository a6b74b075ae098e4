//! `finmate chat` and `finmate ask`

use anyhow::Context;
use async_trait::async_trait;
use finmate_agent::{AnalyzedNews, ChatReply, ChatRequest, ContextAssembler, LoopObserver};
use finmate_llm::{Message, ToolCall};
use finmate_tools::ToolOutput;
use finmate_utils::preview;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::{build_runtime, read_json};
use crate::ContextArgs;
use crate::portfolio::PortfolioFile;

/// Prints tool activity to stderr
struct ToolPrinter;

#[async_trait]
impl LoopObserver for ToolPrinter {
    async fn on_tool_start(&self, call: &ToolCall) {
        eprintln!("  [tool] {}({})", call.name, preview(&call.arguments, 80));
    }

    async fn on_tool_done(&self, call: &ToolCall, output: &ToolOutput, elapsed: Duration) {
        let status = if output.is_error { "failed" } else { "ok" };
        eprintln!("  [tool] {} {status} in {}ms", call.name, elapsed.as_millis());
    }
}

fn build_context(portfolio: &Path, args: &ContextArgs) -> anyhow::Result<String> {
    let tickers = PortfolioFile::new(portfolio).load();

    let news: Vec<AnalyzedNews> = match &args.news {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let document = match &args.document {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?,
        ),
        None => None,
    };

    Ok(ContextAssembler::assemble(&tickers, &news, document.as_deref()))
}

/// One question, JSON envelope on stdout
pub async fn run_ask(
    portfolio: &Path,
    args: &ContextArgs,
    query: String,
    verbose: bool,
) -> anyhow::Result<()> {
    let runtime = build_runtime()?;
    let context = build_context(portfolio, args)?;

    let mut agent = runtime.chat_loop();
    if verbose {
        agent = agent.with_observer(Arc::new(ToolPrinter));
    }

    let reply: ChatReply = agent.run(ChatRequest::new(query).with_context(context)).await;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

/// Interactive chat keeping a rolling history
pub async fn run_repl(portfolio: &Path, args: &ContextArgs, verbose: bool) -> anyhow::Result<()> {
    let runtime = build_runtime()?;
    let context = build_context(portfolio, args)?;

    let mut agent = runtime.chat_loop();
    if verbose {
        agent = agent.with_observer(Arc::new(ToolPrinter));
    }

    println!();
    println!("  FinMate chat");
    println!("  Model:     {}", runtime.config().model);
    println!("  Portfolio: {}", portfolio.display());
    println!("  Type 'refresh' to drop cached market data, 'exit' or Ctrl+D to quit.");
    println!();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Vec<Message> = Vec::new();

    loop {
        stdout.write_all(b"  You > ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }
        if query.eq_ignore_ascii_case("refresh") {
            runtime.tools().clear_cache().await;
            println!("  Cached market data cleared.\n");
            continue;
        }

        let request = ChatRequest::new(query)
            .with_context(context.clone())
            .with_history(history.clone());
        let reply = agent.run(request).await;

        println!("\n  FinMate > {}\n", reply.content);

        history.push(Message::user(query));
        history.push(Message::assistant(reply.content));
        history = ContextAssembler::window_history(&history);
    }

    Ok(())
}
