use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::data_models::SearchResultItem;
use crate::formatter::ResultFormatter;

/// Where result lines go: always stdout, plus the destination file when one
/// was configured. The file is opened once, in append mode, and flushed after
/// every line so an interrupted run keeps everything printed so far.
pub struct ResultSink {
    formatter: ResultFormatter,
    dest: Option<BufWriter<File>>,
    emitted: usize,
}

impl ResultSink {
    pub fn new(formatter: ResultFormatter) -> Result<ResultSink> {
        let dest = match formatter.options().destination_file.as_deref() {
            Some(path) => Some(open_append(Path::new(path))?),
            None => None,
        };
        Ok(ResultSink {
            formatter,
            dest,
            emitted: 0,
        })
    }

    pub fn formatter(&self) -> &ResultFormatter {
        &self.formatter
    }

    /// Number of result lines written so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn emit(&mut self, item: &SearchResultItem) -> Result<()> {
        println!("{}", self.formatter.format_colored(item));

        if let Some(dest) = self.dest.as_mut() {
            writeln!(dest, "{}", self.formatter.format(item))
                .and_then(|_| dest.flush())
                .context("Failed to write result to destination file")?;
        }
        self.emitted += 1;
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open destination file {}", path.display()))?;
    Ok(BufWriter::new(file))
}
