use std::io::Read;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use gh_query::{
    GhQueryError, GitHubClient, Normalizer, QueryConfig, QueryController, Result, Variables,
};

use crate::cli::QueryArgs;
use crate::output;

static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([_A-Za-z][_0-9A-Za-z]*)=(.*)$").expect("variable pattern is valid")
});

pub async fn run(client: Arc<GitHubClient>, args: QueryArgs) -> Result<()> {
    let query = read_query(&args)?;
    let variables = build_variables(args.variables.as_deref(), &args.vars)?;
    let normalize = match args.select {
        Some(path) => Normalizer::pointer(path),
        None => Normalizer::identity(),
    };

    let config = QueryConfig::new(query)
        .maybe_variables(variables)
        .normalize(normalize);

    let mut controller = QueryController::new(client, config.normalizer().clone());
    let mut watch = controller.subscribe();
    controller.use_query(&config)?;

    let state = super::wait_settled(&mut watch).await?;

    output::print_state(&state);

    match state.error() {
        Some(error) => Err(GhQueryError::QueryFailed(error.to_string())),
        None => Ok(()),
    }
}

fn read_query(args: &QueryArgs) -> Result<String> {
    if let Some(path) = &args.file {
        return Ok(std::fs::read_to_string(path)?);
    }

    match args.query.as_deref() {
        Some("-") => {
            let mut query = String::new();
            std::io::stdin().read_to_string(&mut query)?;
            Ok(query)
        }
        Some(query) => Ok(query.to_string()),
        None => Err(GhQueryError::InvalidQuery("no query given".to_string())),
    }
}

/// Parse `name=value`. The value is read as JSON when possible so that
/// `first=10` is a number and `owner=rust-lang` is a string.
pub fn parse_var(raw: &str) -> Result<(String, Value)> {
    let caps = VAR_RE
        .captures(raw)
        .ok_or_else(|| GhQueryError::InvalidVariable(raw.to_string()))?;

    let name = caps[1].to_string();
    let text = &caps[2];
    let value = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));

    Ok((name, value))
}

/// Merge `--variables` with `--var` pairs; pairs win on conflicts.
pub fn build_variables(json: Option<&str>, pairs: &[String]) -> Result<Option<Variables>> {
    let mut variables = match json {
        Some(text) => match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Some(map),
            _ => {
                return Err(GhQueryError::InvalidVariable(
                    "--variables must be a JSON object".to_string(),
                ))
            }
        },
        None => None,
    };

    for raw in pairs {
        let (name, value) = parse_var(raw)?;
        variables
            .get_or_insert_with(Variables::new)
            .insert(name, value);
    }

    Ok(variables)
}
