use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use gh_query::{GhQueryError, GitHubClient, Query, QueryConfig, Result, Variables};

use crate::output;

/// One render: the inputs a view would pass on that render.
#[derive(Deserialize, Debug, PartialEq)]
pub struct RenderLine {
    pub query: String,
    #[serde(default)]
    pub variables: Option<Variables>,
}

pub fn parse_lines(contents: &str) -> Result<Vec<RenderLine>> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| serde_json::from_str(line).map_err(GhQueryError::from))
        .collect()
}

pub async fn run(client: Arc<GitHubClient>, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let renders = parse_lines(&contents)?;

    let Some(first) = renders.first() else {
        output::print_message("Nothing to replay.");
        return Ok(());
    };

    let mut view = Query::mount(client, &config_for(first))?;
    let mut watch = view.subscribe();

    for (index, render) in renders.iter().enumerate() {
        let config = config_for(render);
        let before = view.controller().generation();

        view.render(&config, |_| ())?;
        let issued = view.controller().generation() != before;
        debug!(render = index + 1, issued, "replayed render");

        if issued {
            super::wait_settled(&mut watch).await?;
        }

        view.render(&config, |state| {
            if output::is_json_output() {
                let line = json!({
                    "render": index + 1,
                    "issued": issued,
                    "state": state,
                });
                println!("{line}");
            } else {
                let marker = if issued { "request" } else { "reused " };
                println!(
                    "#{:<3} {} {}",
                    index + 1,
                    marker,
                    output::compact_line(state)
                );
            }
        })?;
    }

    Ok(())
}

fn config_for(render: &RenderLine) -> QueryConfig<Value> {
    QueryConfig::new(render.query.clone()).maybe_variables(render.variables.clone())
}
