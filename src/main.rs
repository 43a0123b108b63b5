use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use netblock::config::Cli;
use std::error::Error;
use std::path::Path;

const LOG_CONFIG: &str = "log4rs.yml";

/// Log from `log4rs.yml` when present, else warnings to stderr.
fn init_logging() -> Result<(), Box<dyn Error>> {
    if Path::new(LOG_CONFIG).exists() {
        log4rs::init_file(LOG_CONFIG, Default::default())?;
        return Ok(());
    }
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    init_logging()?;
    log::info!("#Start main()");

    let cli = Cli::parse();
    print!("{}", netblock::run(&cli)?);

    Ok(())
}
