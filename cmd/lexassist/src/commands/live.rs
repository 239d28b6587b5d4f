//! `lexassist live`: search as you type, one query per input line.
//!
//! Every line supersedes the previous one through the debounced
//! [`SearchScheduler`]; only settled queries print. A blank line cancels the
//! pending search.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use domains::SearchOptions;
use serde_json::json;
use services::{ScheduledResult, SearchScheduler};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::app::App;

pub async fn live(app: &App, options: SearchOptions) -> Result<ExitCode> {
    let scheduler = SearchScheduler::new(Arc::clone(&app.search), app.debounce);
    let stdin = BufReader::new(tokio::io::stdin());
    run_live(&scheduler, stdin, &mut std::io::stdout(), options).await?;
    Ok(ExitCode::SUCCESS)
}

/// Feeds `input` lines to `scheduler` and writes each published result to
/// `out` as one JSON line. Returns once input ends and the last submitted
/// query has printed.
pub async fn run_live<R, W>(
    scheduler: &SearchScheduler,
    input: R,
    out: &mut W,
    options: SearchOptions,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut results = scheduler.subscribe();
    let mut reading = true;
    let mut awaiting: Option<u64> = None;
    let mut printed = 0u64;

    loop {
        if !reading && awaiting.map_or(true, |generation| printed >= generation) {
            return Ok(());
        }

        tokio::select! {
            line = lines.next_line(), if reading => match line? {
                Some(line) if line.trim().is_empty() => {
                    scheduler.cancel();
                    awaiting = None;
                }
                Some(line) => awaiting = Some(scheduler.submit(line, options.clone())),
                None => {
                    debug!("live input closed");
                    reading = false;
                }
            },
            changed = results.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let published = results.borrow_and_update().clone();
                if let Some(published) = published.filter(|p| p.generation > printed) {
                    printed = published.generation;
                    write_result(out, &published)?;
                }
            }
        }
    }
}

fn write_result<W: Write>(out: &mut W, published: &ScheduledResult) -> Result<()> {
    let response = &published.response;
    let line = json!({
        "generation": published.generation,
        "query": response.query,
        "source": response.source,
        "total": response.total,
        "message": response.message,
        "data": response.data,
    });
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::KeyValueStore;
    use services::{ForumSearchFallback, SearchConfig};
    use std::time::Duration;
    use storage_adapters::MemoryKvStore;

    const POSTS: &str = r#"[
        {"id": "1", "body": "Unpaid overtime", "category": "Labor Law"},
        {"id": "2", "body": "Deposit kept by landlord", "category": "Civil Law"}
    ]"#;

    async fn scheduler() -> SearchScheduler {
        let store = Arc::new(MemoryKvStore::new());
        store.set("forum_posts_cache", POSTS).await.unwrap();
        let search = ForumSearchFallback::new(store, SearchConfig::default());
        SearchScheduler::new(Arc::new(search), Duration::from_millis(300))
    }

    fn printed_lines(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_lines_prints_only_the_settled_query() {
        let scheduler = scheduler().await;
        let mut out = Vec::new();

        run_live(&scheduler, &b"#\n#lab\n#labour\n"[..], &mut out, SearchOptions::default())
            .await
            .unwrap();

        let lines = printed_lines(&out);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["query"], "#labour");
        assert_eq!(lines[0]["generation"], 3);
        assert_eq!(lines[0]["data"][0]["id"], "1");
    }

    #[tokio::test(start_paused = true)]
    async fn trailing_blank_line_cancels_and_prints_nothing() {
        let scheduler = scheduler().await;
        let mut out = Vec::new();

        run_live(&scheduler, &b"deposit\n\n"[..], &mut out, SearchOptions::default())
            .await
            .unwrap();

        assert!(out.is_empty());
    }
}
