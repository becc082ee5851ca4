use std::collections::HashSet;
use std::fs;

/// Turns the query argument into the list of dorks to run.
///
/// If `source` names a readable file, each non-blank line is a dork and
/// repeated lines are dropped (first occurrence wins). Otherwise `source`
/// itself is the single dork.
pub fn load_queries(source: &str) -> Vec<String> {
    let content = match fs::read_to_string(source) {
        Ok(content) => content,
        Err(e) => {
            log::debug!("query source is not a readable file ({e}), using it as a literal dork");
            return vec![source.to_string()];
        }
    };

    let mut seen = HashSet::new();
    let queries: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect();

    log::info!("Loaded {} queries from {}", queries.len(), source);
    queries
}

/// Drops every query before `current_query`. A saved query that is no longer
/// in the list leaves nothing to resume.
pub fn resume_from(queries: Vec<String>, current_query: Option<&str>) -> Vec<String> {
    let Some(current) = current_query else {
        return queries;
    };
    match queries.iter().position(|q| q == current) {
        Some(index) => queries.into_iter().skip(index).collect(),
        None => {
            log::warn!("saved query {current:?} not found in the query source, nothing to resume");
            Vec::new()
        }
    }
}
