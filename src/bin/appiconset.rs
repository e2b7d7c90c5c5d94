use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "appiconset",
    version,
    about = "Generate AppIcon.appiconset from a 1024x1024 master PNG"
)]
struct Cli {
    /// Path to the square master image.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Directory in which AppIcon.appiconset is (re)created.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Manifest JSON to use instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Resample and encode entries on a worker pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Log debug events.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<appiconset::IconsetError>()
                .map_or(1, appiconset::IconsetError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default = if cli.verbose {
        "appiconset=debug"
    } else if cli.quiet {
        "appiconset=warn"
    } else {
        "appiconset=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let input = cli.input.ok_or(appiconset::IconsetError::MissingInputPath)?;

    let manifest = match &cli.manifest {
        Some(path) => appiconset::IconManifest::from_path(path)?,
        None => appiconset::IconManifest::builtin().context("load built-in manifest")?,
    };

    let opts = appiconset::GenerateOpts {
        out_dir: cli.out_dir,
        manifest,
        threading: appiconset::RenderThreading {
            parallel: cli.parallel,
            threads: cli.threads,
        },
    };

    let report = appiconset::generate_appiconset_from_path(&input, &opts)?;
    eprintln!(
        "wrote {} ({} images)",
        report.dir.display(),
        report.images_written
    );
    Ok(())
}
