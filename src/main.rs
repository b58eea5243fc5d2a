use log::{error, info};
use std::env;
use std::process;

use recipe_book::{run, AppSettings, RunOutcome};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional path to the settings file; defaults to config.toml
    let config_path = env::args().nth(1);

    let settings = match AppSettings::load(config_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            process::exit(1);
        }
    };

    match run(&settings) {
        Ok(RunOutcome::EmptyCorpus) => info!("Nothing to publish"),
        Ok(RunOutcome::Published {
            recipes,
            documents,
            keywords,
        }) => info!("Published {recipes} recipes, {documents} documents and {keywords} keywords"),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
