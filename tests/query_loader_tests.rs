use anyhow::Result;
use std::collections::HashSet;

use gdorker::query_loader::{load_queries, resume_from};

mod test_helpers {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

    pub fn write_dork_file(content: &str) -> PathBuf {
        let count = TEST_FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis();
        let path = std::env::temp_dir().join(format!(
            "gdorker_dorks_{}_{}_{}.txt",
            std::process::id(),
            timestamp,
            count
        ));
        std::fs::write(&path, content).unwrap();
        path
    }
}

use test_helpers::*;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_literal_dork() {
    let queries = load_queries("site:example.com inurl:admin");
    assert_eq!(queries, strings(&["site:example.com inurl:admin"]));
}

#[test]
fn test_unreadable_path_becomes_literal() {
    let source = "/definitely/not/here/dorks.txt";
    assert_eq!(load_queries(source), strings(&[source]));
}

#[test]
fn test_file_with_duplicate_line() -> Result<()> {
    let path = write_dork_file("inurl:admin\nfiletype:pdf\nintitle:index.of\ninurl:admin\next:env\n");

    let queries = load_queries(path.to_str().unwrap());
    assert_eq!(queries.len(), 4);
    let distinct: HashSet<&String> = queries.iter().collect();
    assert_eq!(distinct.len(), 4);

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_file_keeps_order_and_skips_blank_lines() -> Result<()> {
    let path = write_dork_file("  site:a.test  \r\n\n\nsite:b.test\r\n   \nsite:a.test\nsite:c.test");

    let queries = load_queries(path.to_str().unwrap());
    assert_eq!(queries, strings(&["site:a.test", "site:b.test", "site:c.test"]));

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_resume_from_second_of_three() {
    let queries = strings(&["one", "two", "three"]);
    assert_eq!(resume_from(queries, Some("two")), strings(&["two", "three"]));
}

#[test]
fn test_resume_without_saved_query_keeps_everything() {
    let queries = strings(&["one", "two"]);
    assert_eq!(resume_from(queries.clone(), None), queries);
}

#[test]
fn test_resume_with_unknown_query_is_empty() {
    let queries = strings(&["one", "two"]);
    assert!(resume_from(queries, Some("zero")).is_empty());
}

#[test]
fn test_resume_requires_exact_match() {
    let queries = strings(&["inurl:admin", "inurl:admin ext:php"]);
    assert_eq!(
        resume_from(queries, Some("inurl:admin ext:php")),
        strings(&["inurl:admin ext:php"])
    );
}
