mod cli;
mod config;
mod console;
mod domain;
mod infra;
mod media;
mod workflows;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;

use cli::Cli;
use console::Console;
use infra::packages::{LocalPackageSource, PackageSource};
use media::metadata::FilenameGuesser;
use workflows::getsub::{print_summary, GetSubtitles, Options};
use workflows::prompt::{Chooser, TerminalChooser};

fn main() {
    let cli = Cli::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if cli.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        },
    );
    clog.init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::load_settings()?;
    let console = Console::new(settings.prefix.clone());

    if cli.over {
        println!("\nThe script will replace the old subtitles if exist...\n");
    }

    let mut package_dirs = cli.archives.clone();
    if package_dirs.is_empty() {
        package_dirs = settings.package_dirs.clone();
    }
    if package_dirs.is_empty() {
        bail!("No subtitle archives to search. Pass --archives or set package_dirs in the config file");
    }

    let videos = infra::videos::discover(&cli.name, cli.directory.as_deref(), &settings.language_tag)?;

    let guesser = FilenameGuesser;
    let sub_num = cli.number.filter(|n| *n > 0).unwrap_or(settings.sub_num);
    let sources: Vec<Box<dyn PackageSource + '_>> =
        vec![Box::new(LocalPackageSource::new(package_dirs, &guesser))];

    let mut terminal = if cli.query || cli.single {
        Some(TerminalChooser::new(&console, sub_num)?)
    } else {
        None
    };
    let chooser = terminal.as_mut().map(|t| t as &mut dyn Chooser);

    let options = Options {
        query: cli.query,
        single: cli.single,
        more: cli.more,
        both: cli.both,
        over: cli.over,
        plex: cli.plex,
        debug: cli.debug,
        sub_num,
        language_tag: settings.language_tag.clone(),
        max_archive_depth: settings.max_archive_depth,
    };

    let summary = GetSubtitles::new(options, sources, &guesser, &console, chooser).run(&videos);
    print_summary(&summary, cli.debug);

    if let Some(report) = &cli.report {
        let content = serde_json::to_string_pretty(&summary)?;
        fs::write(report, content)
            .with_context(|| format!("Failed to write report {}", report.display()))?;
    }

    Ok(())
}
