mod build;
mod error;
mod scaffold;
mod watch;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use env_logger::Env;
use quill_collector::{Collector, FileSystemLoader};
use quill_render::Template;

use crate::build::{build_site, BuildOptions};
use crate::watch::Watcher;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill: static sites from plain HTML templates")]
#[command(version)]
struct Cli {
    /// Log every pipeline step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a starter site
    New {
        /// Site source directory
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Overwrite an existing index.html
        #[arg(short = 'F', long)]
        force: bool,
    },

    /// Render every top-level page into the output directory
    Build {
        /// Site source directory
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Output directory, relative to the root
        #[arg(short, long, default_value = "site")]
        output: PathBuf,

        /// Build into an existing output directory
        #[arg(short = 'F', long)]
        force: bool,

        /// Keep running and rebuild when source files change
        #[arg(short, long)]
        watch: bool,

        /// JSON object merged into every page's context
        #[arg(short, long)]
        context: Option<PathBuf>,
    },

    /// Check a page for errors without writing output
    Check {
        /// Page path, relative to the root
        path: String,

        /// Site source directory
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::New { root, force } => cmd_new(root, force),
        Command::Build {
            root,
            output,
            force,
            watch,
            context,
        } => cmd_build(
            BuildOptions {
                root,
                output,
                force,
                context,
            },
            watch,
        ),
        Command::Check { path, root } => cmd_check(&path, root),
    }
}

/// `RUST_LOG` wins over the default `info`; `--verbose` wins over both.
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).format_target(false).init();
}

fn cmd_new(root: PathBuf, force: bool) {
    match scaffold::new_site(&root, force) {
        Ok(files) => eprintln!("Created {} files in {}", files.len(), root.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn cmd_build(options: BuildOptions, watch: bool) {
    let ok = run_build(&options);
    if !watch {
        if !ok {
            process::exit(1);
        }
        return;
    }

    // Every rebuild writes over the previous output.
    let options = BuildOptions {
        force: true,
        ..options
    };
    let mut watcher = Watcher::new(&options.root, vec![options.output_dir()]);
    eprintln!(
        "Watching {} ({} files), press Ctrl+C to stop",
        options.root.display(),
        watcher.tracked()
    );
    watcher.run(Duration::from_secs(1), || {
        run_build(&options);
    });
}

/// Build once and report. False when anything failed.
fn run_build(options: &BuildOptions) -> bool {
    match build_site(options) {
        Ok(report) => {
            for (page, e) in &report.failures {
                eprintln!("Error in {page}: {e}");
            }
            eprintln!(
                "Built {} page(s) into {}",
                report.pages.len(),
                options.output_dir().display()
            );
            report.failures.is_empty()
        }
        Err(e) => {
            eprintln!("Error: {e}");
            false
        }
    }
}

fn cmd_check(path: &str, root: PathBuf) {
    let mut collector = Collector::new(FileSystemLoader::new(root), path);
    let source = match collector.flatten() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = Template::new(&source) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    eprintln!("OK: {path}");
}
