use std::path::PathBuf;

use clap::Parser;

use crate::data_models::{Engine, OutputOptions};

const AFTER_HELP: &str = "\
Examples:
    gdorker -q \"site:example.com\" -k YOUR_API_KEY -x YOUR_CSE_ID
    gdorker -q \"inurl:admin\" -t -c -b
    gdorker -q \"filetype:pdf\" -f results.txt -b
    gdorker -q ./bb_dorks.txt -f results.txt -b --engine duckduckgo
    gdorker --session ./gdorker_session_1744260850.json

Credentials may also come from GOOGLE_API_KEY / GOOGLE_CSE_ID or from
~/.config/gdorker/config.json, which is created on first run.";

/// Runs search-engine dorks page by page, with resumable sessions.
#[derive(Parser, Debug)]
#[command(name = "gdorker", version, about, after_help = AFTER_HELP)]
pub struct Cli {
    /// Dork string, or path to a file with one dork per line
    #[arg(short, long, required_unless_present = "session")]
    pub query: Option<String>,

    /// Google Custom Search API key
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Google Custom Search Engine ID
    #[arg(short = 'x', long = "cx", visible_alias = "cse-id")]
    pub cse_id: Option<String>,

    /// Search backend
    #[arg(short, long, value_enum, default_value_t = Engine::Google)]
    pub engine: Engine,

    /// Include the page title
    #[arg(short, long)]
    pub title: bool,

    /// Include the HTTP status code (fetches every result URL)
    #[arg(short, long)]
    pub code: bool,

    /// Include the first 100 characters of the page body (fetches every result URL unless the engine supplies a snippet)
    #[arg(short, long)]
    pub body: bool,

    /// Append results to this file
    #[arg(short, long)]
    pub file: Option<String>,

    /// Verbose diagnostic output
    #[arg(short, long)]
    pub debug: bool,

    /// Resume from this session file (and keep saving to it)
    #[arg(short, long)]
    pub session: Option<PathBuf>,

    /// Config file holding google_api_key / google_cse_id
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,
}

impl Cli {
    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            show_title: self.title,
            show_http_code: self.code,
            show_body_snippet: self.body,
            destination_file: self.file.clone(),
            debug: self.debug,
            engine: self.engine,
        }
    }
}
