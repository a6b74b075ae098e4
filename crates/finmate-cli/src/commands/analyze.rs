//! `finmate analyze` - score a news file against the portfolio

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use finmate_agent::{AnalysisSource, AnalyzedNews, NewsItem};
use finmate_utils::truncate_chars;
use std::path::Path;
use tracing::info;

use super::{build_runtime, read_json};
use crate::portfolio::PortfolioFile;

pub async fn run(portfolio: &Path, news: &Path, json: bool) -> anyhow::Result<()> {
    let items: Vec<NewsItem> = read_json(news)?;
    let tickers = PortfolioFile::new(portfolio).load();
    let runtime = build_runtime()?;

    info!(items = items.len(), tickers = tickers.len(), "Scoring news file");
    let analyzed = runtime.analyzer().analyze_batch(&items, &tickers).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&analyzed)?);
    } else {
        let mut table = render_table(&analyzed);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        println!("{table}");
    }
    Ok(())
}

fn render_table(analyzed: &[AnalyzedNews]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            "Headline", "Sentiment", "Category", "Impact", "Risk", "Tickers", "Source",
        ]);

    for entry in analyzed {
        let a = &entry.analysis;
        let source = match entry.source {
            AnalysisSource::Model => "model",
            AnalysisSource::Fallback => "fallback",
        };
        table.add_row(vec![
            truncate_chars(&a.headline, 60).to_string(),
            format!("{}/10", a.sentiment_score),
            a.category.to_string(),
            a.impact.to_string(),
            a.risk_level.to_string(),
            a.affected_tickers.join(", "),
            source.to_string(),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use finmate_agent::fallback_analysis;

    #[test]
    fn test_table_lists_every_item() {
        let items = [
            NewsItem::new("NVDA beats estimates", "Data center revenue up", "wire", ""),
            NewsItem::new("Fed holds rates", "", "wire", ""),
        ];
        let tickers = vec!["NVDA".to_string()];
        let analyzed: Vec<AnalyzedNews> = items
            .iter()
            .map(|item| AnalyzedNews {
                item: item.clone(),
                analysis: fallback_analysis(item, &tickers),
                source: AnalysisSource::Fallback,
            })
            .collect();

        let rendered = render_table(&analyzed).to_string();
        assert!(rendered.contains("NVDA beats estimates"));
        assert!(rendered.contains("Fed holds rates"));
        assert!(rendered.contains("5/10"));
        assert!(rendered.contains("fallback"));
    }
}
