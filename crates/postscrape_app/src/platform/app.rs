use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use engine_logging::{engine_info, initialize};
use log::LevelFilter;
use postscrape_core::JobStatus;
use postscrape_engine::{
    ChromeLauncher, ChromeOptions, CsvSink, EngineParts, OpenAiContentGenerator, OpenAiSettings,
    ScrapeController, ScrapeSettings,
};

use super::console::Console;
use super::persistence::load_selectors;
use crate::cli::{Cli, Command, GeneratorArgs};

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    initialize(cli.log_to.into(), Path::new("."), LevelFilter::Info);
    engine_info!("postscrape {} starting", env!("CARGO_PKG_VERSION"));

    let settings = ScrapeSettings {
        output_dir: cli.output_dir.clone(),
        ..ScrapeSettings::default()
    };
    let launcher = ChromeLauncher::new(ChromeOptions {
        headless: cli.headless,
        executable: cli.chrome_path.clone(),
        ..ChromeOptions::default()
    });
    let sink = CsvSink::new(settings.output_dir.clone());
    let parts = EngineParts::new(Arc::new(launcher), Arc::new(sink))
        .with_selectors(load_selectors(&cli.selectors))
        .with_settings(settings);

    let mut console = Console::new(io::stdin().lock(), io::stdout());

    match cli.command {
        Command::Scrape(args) => {
            let controller = ScrapeController::start(parts);
            controller.start_scrape(args.payload().normalize());
            let view = console
                .follow(&controller, |view| !view.status.is_busy())
                .context("following scrape progress")?;
            controller.shutdown();

            match (view.status, view.output_path) {
                (JobStatus::Idle, Some(path)) => {
                    println!("{}", path.display());
                    Ok(())
                }
                _ => bail!("scrape did not complete"),
            }
        }
        Command::Post {
            login,
            generator,
            topic,
        } => {
            let parts = match content_generator(&generator)? {
                Some(generator) => parts.with_generator(Arc::new(generator)),
                None => parts,
            };
            let controller = ScrapeController::start(parts);
            let reply = controller.poster_generate_and_post(login.credentials(), topic);
            console
                .follow(&controller, |view| !view.poster_running)
                .context("following poster progress")?;
            controller.shutdown();

            if reply == JobStatus::Error {
                bail!("post request was rejected");
            }
            Ok(())
        }
    }
}

/// Without an API key posts are written from the local fallback copy.
fn content_generator(args: &GeneratorArgs) -> anyhow::Result<Option<OpenAiContentGenerator>> {
    let Some(api_key) = args.openai_api_key.as_deref().filter(|key| !key.trim().is_empty()) else {
        engine_info!("OPENAI_API_KEY not set; posts use the built-in template");
        return Ok(None);
    };

    let mut settings = OpenAiSettings::new(api_key.trim());
    if let Some(model) = &args.openai_model {
        settings.model = model.clone();
    }
    let generator =
        OpenAiContentGenerator::new(settings).context("building the OpenAI client")?;
    Ok(Some(generator))
}
