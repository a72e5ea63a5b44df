use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine_logging::LogDestination;
use postscrape_core::{Credentials, PageInput, ScrapePayload};

#[derive(Debug, Parser)]
#[command(name = "postscrape")]
#[command(about = "Collect LinkedIn content-search posts into a CSV file")]
#[command(version)]
pub struct Cli {
    /// RON file overriding the built-in CSS selectors
    #[arg(long, global = true, default_value = "selectors.ron")]
    pub selectors: PathBuf,

    /// Directory receiving result files
    #[arg(long, global = true, env = "POSTSCRAPE_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Run the browser without a window
    #[arg(long, global = true, env = "POSTSCRAPE_HEADLESS")]
    pub headless: bool,

    /// Chrome/Chromium binary to launch
    #[arg(long, global = true, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Where diagnostic logs go
    #[arg(long, global = true, value_enum, default_value_t = LogTarget::File)]
    pub log_to: LogTarget,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    #[arg(long, env = "LINKEDIN_EMAIL", default_value = "")]
    pub email: String,

    #[arg(long, env = "LINKEDIN_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,
}

impl LoginArgs {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.email, self.password.as_str())
    }
}

#[derive(Debug, Clone, Args)]
pub struct GeneratorArgs {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in, walk the result pages and write them to CSV
    Scrape(ScrapeArgs),

    /// Generate a post for a topic and publish it
    Post {
        #[command(flatten)]
        login: LoginArgs,

        #[command(flatten)]
        generator: GeneratorArgs,

        /// Topic the post is written about
        topic: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ScrapeArgs {
    #[command(flatten)]
    pub login: LoginArgs,

    /// Free-text search term
    #[arg(default_value = "")]
    pub search_term: String,

    /// Number of result pages to visit
    #[arg(long, default_value = "1")]
    pub pages: String,

    /// `relevance` or `recent`
    #[arg(long, default_value = "relevance")]
    pub sort_by: String,

    /// `past-24h`, `past-week` or `past-month`
    #[arg(long, default_value = "")]
    pub date_posted: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub industry: Option<String>,
}

impl ScrapeArgs {
    /// Same shape the UI submits, so coercion rules stay in one place.
    pub fn payload(&self) -> ScrapePayload {
        ScrapePayload {
            email: Some(self.login.email.clone()),
            password: Some(self.login.password.clone()),
            search_term: Some(self.search_term.clone()),
            pages: Some(PageInput::Text(self.pages.clone())),
            sort_by: Some(self.sort_by.clone()),
            date_posted: Some(self.date_posted.clone()),
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            industry: self.industry.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postscrape_core::SortMode;

    #[test]
    fn scrape_arguments_normalize_into_a_request() {
        let cli = Cli::try_parse_from([
            "postscrape",
            "scrape",
            "--email",
            " me@example.com ",
            "--password",
            "pw",
            "--pages",
            "zero",
            "--sort-by",
            "recent",
            "--title",
            "Engineer",
            "rust jobs",
        ])
        .unwrap();
        let Command::Scrape(args) = cli.command else {
            panic!("expected scrape");
        };
        let request = args.payload().normalize();
        assert_eq!(request.credentials.email, "me@example.com");
        assert_eq!(request.search_term, "rust jobs");
        assert_eq!(request.page_limit, 1);
        assert_eq!(request.sort, SortMode::Recent);
        assert_eq!(request.filters.title, "Engineer");
    }
}
