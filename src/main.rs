use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use vdsmv::cli::Cli;
use vdsmv::container::Container;
use vdsmv::{log, logger, rewrite};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    log!("open"; "operating on {}", cli.file.display());
    log!("open"; "replacing source path prefix `{}`", cli.from);
    log!("open"; "                        with `{}`", cli.to);

    // An open failure aborts before any mutation is possible.
    let mut container = Container::open(&cli.file)
        .with_context(|| format!("unable to open container `{}`", cli.file.display()))?;

    let stats = rewrite::run(&mut container, &cli.from, &cli.to)
        .context("traversal failed, container left unmodified on disk")?;

    container.save().context("failed to write container back")?;
    log!("save"; "wrote {}", container.path().display());

    stats.report();
    Ok(())
}
