use appiconizer::catalog::{self, PlatformProfile, UnknownProfileError};
use appiconizer::config::{self, IconizerConfig};
use appiconizer::output;
use appiconizer::pipeline::{self, CancelToken, PipelineConfig, RunRequest};
use appiconizer::sink::PackagingMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Profile selection shared by `create` and `sizes`.
#[derive(clap::Args, Clone)]
struct ProfileArgs {
    /// Platform profile: ios, android or all [default: from config, else all]
    #[arg(long)]
    device: Option<String>,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once; only called at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "appiconizer")]
#[command(about = "Generate app icon sets for iOS and Android from one image")]
#[command(long_about = "\
Generate app icon sets for iOS and Android from one image

Each width in the selected profile is resized from the source (Lanczos3,
aspect ratio preserved) and written as icon_<width>.png.

Profiles:
  ios      29 48 55 58 87 88 80 120 180 40 76 152 167 172 196
  android  48 72 96 144 192
  all      29 48 55 58 87 88 80 120 180 40 76 152 167 48 72 96 144 192 172 196
           (48 is rendered once)

Output is created next to the source image, or inside --target:

  appiconizer 2026-10-19 14.03.27/        # default
  appiconizer 2026-10-19 14.03.27.zip     # with --zip

Examples:
  appiconizer create --source icon.png
  appiconizer create --source icon.png --device ios --zip --target build/

Run 'appiconizer gen-config' to generate a documented appiconizer.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file [default: ./appiconizer.toml when present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of CPUs to use for rendering (overrides processing.max_processes)
    #[arg(long, global = true)]
    cpus: Option<usize>,

    /// Log diagnostics to stderr (-v info, -vv debug; RUST_LOG overrides)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the icon set for a source image
    Create {
        /// Source image
        #[arg(long)]
        source: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Directory to create the output in [default: the source's directory]
        #[arg(long)]
        target: Option<PathBuf>,

        /// Package the icons into a single zip archive
        #[arg(long)]
        zip: bool,
    },
    /// Print the widths a profile renders
    Sizes(ProfileArgs),
    /// Print a stock appiconizer.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut cfg = config::load_config(cli.config.as_deref(), &std::env::current_dir()?)?;
    if let Some(cpus) = cli.cpus {
        cfg.processing.max_processes = Some(cpus);
        cfg.validate()?;
    }

    match cli.command {
        Command::Create {
            source,
            profile,
            target,
            zip,
        } => {
            let profile = resolve_profile(&profile, &cfg)?;
            let packaging = if zip {
                PackagingMode::Archive
            } else {
                PackagingMode::Directory
            };
            let request = RunRequest::new(source, target, profile, packaging);
            let pipeline_config = PipelineConfig::from_config(&cfg);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_pipeline_event(&event);
                }
            });
            let result = pipeline::run(&request, &pipeline_config, Some(tx), &CancelToken::new());
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            result?;
        }
        Command::Sizes(profile) => {
            let profile = resolve_profile(&profile, &cfg)?;
            output::print_sizes(profile, &catalog::resolve(profile).distinct());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Explicit `--device` wins over the configured default profile.
fn resolve_profile(
    args: &ProfileArgs,
    cfg: &IconizerConfig,
) -> Result<PlatformProfile, UnknownProfileError> {
    match &args.device {
        Some(device) => device.parse(),
        None => Ok(cfg.default_profile),
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
