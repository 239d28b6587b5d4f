//! `lexassist search` and `lexassist suggest`

use std::process::ExitCode;

use anyhow::Result;
use domains::{SearchOptions, SortBy};

use crate::app::App;

pub async fn search(
    app: &App,
    query: &str,
    category: Option<String>,
    sort_by: SortBy,
    limit: Option<usize>,
    offline: bool,
) -> Result<ExitCode> {
    let options = SearchOptions {
        sort_by,
        limit,
        category,
    };
    let response = if offline {
        app.search.search_offline(query, &options).await
    } else {
        app.search.search(query, &options).await
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub async fn suggest(app: &App, query: &str) -> Result<ExitCode> {
    for suggestion in app.search.suggestions(query).await {
        println!("{suggestion}");
    }
    Ok(ExitCode::SUCCESS)
}
