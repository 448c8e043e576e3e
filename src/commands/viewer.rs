use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

use gh_query::{GhQueryError, GitHubClient, Normalizer, Query, QueryConfig, Result};

use crate::output;

const VIEWER_QUERY: &str = r#"
query Viewer {
    viewer {
        login
        name
        url
    }
}
"#;

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Viewer {
    pub login: String,
    pub name: Option<String>,
    pub url: String,
}

#[derive(Tabled)]
struct ViewerRow {
    #[tabled(rename = "Login")]
    login: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&Viewer> for ViewerRow {
    fn from(viewer: &Viewer) -> Self {
        Self {
            login: viewer.login.clone(),
            name: viewer.name.clone().unwrap_or_default(),
            url: viewer.url.clone(),
        }
    }
}

pub async fn show(client: Arc<GitHubClient>) -> Result<()> {
    let config =
        QueryConfig::new(VIEWER_QUERY).normalize(Normalizer::<Viewer>::pointer_deserialize("/viewer"));
    let mut view = Query::mount(client, &config)?;
    let mut watch = view.subscribe();

    view.render(&config, |_| ())?;
    super::wait_settled(&mut watch).await?;

    view.render(&config, |state| {
        if let Some(error) = state.error() {
            return Err(GhQueryError::QueryFailed(error.to_string()));
        }

        if let Some(viewer) = state.data() {
            if output::is_json_output() {
                println!("{}", serde_json::to_string_pretty(viewer).unwrap_or_default());
            } else {
                let table = Table::new([ViewerRow::from(viewer)])
                    .with(Style::rounded())
                    .to_string();
                println!("{table}");
            }
        }

        Ok(())
    })?
}
