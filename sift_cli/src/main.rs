use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use engine::{ScanConfig, Session};

mod report;

#[derive(Parser)]
#[command(name = "stegsift", version, about = "Yet another stego tool")]
struct Args {
    /// The file to analyze
    file: PathBuf,

    /// Directory to place output in
    #[arg(short, long, default_value = "./results")]
    out: PathBuf,

    /// Check file for metadata information
    #[arg(long)]
    meta: bool,

    /// Perform various image transformations on the input image and save
    /// them to the output directory
    #[arg(long)]
    image_transform: bool,

    /// Attempt to brute force any LSB related steganography
    #[arg(long)]
    brute_lsb: bool,

    /// Analyze a color map. Optional values are color map indexes to save
    /// while searching
    #[arg(long, num_args = 0.., value_name = "N")]
    color_map: Option<Vec<usize>>,

    /// Same as --color-map but keeps a whole range of color map values
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    color_map_range: Option<Vec<usize>>,

    /// Extract a specific LSB RGB from the image. Use with --red, --green,
    /// --blue and --alpha
    #[arg(long)]
    extract_lsb: bool,

    #[arg(long, num_args = 1.., value_name = "INDEX")]
    red: Vec<u8>,

    #[arg(long, num_args = 1.., value_name = "INDEX")]
    green: Vec<u8>,

    #[arg(long, num_args = 1.., value_name = "INDEX")]
    blue: Vec<u8>,

    #[arg(long, num_args = 1.., value_name = "INDEX")]
    alpha: Vec<u8>,

    /// Check for trailing data on the given file
    #[arg(long)]
    trailing: bool,

    /// Write a JSON report of the run to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn config(&self) -> ScanConfig {
        ScanConfig {
            meta: self.meta,
            image_transform: self.image_transform,
            brute_lsb: self.brute_lsb,
            color_map: self.color_map.clone(),
            color_map_range: self.color_map_range.as_ref().map(|r| (r[0], r[1])),
            extract_lsb: self.extract_lsb,
            red: self.red.clone(),
            green: self.green.clone(),
            blue: self.blue.clone(),
            alpha: self.alpha.clone(),
            trailing: self.trailing,
            debug: self.debug,
        }
    }
}

fn init_logging(debug: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else {
        builder.filter_level(if debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        });
    }
    builder.init();
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(&args.file, &args.out, args.config())?;

    let modules = modules::enabled_modules(session.config());
    if modules.is_empty() {
        log::warn!("No modules enabled; nothing to do (try --meta, --trailing, ...)");
    }
    session.run(modules)?;

    for outcome in session.record() {
        log::info!(
            "{}: {} finding(s){}",
            outcome.name,
            outcome.findings,
            if outcome.completed { "" } else { " (failed)" }
        );
    }
    log::info!("{} finding(s) kept in total", session.findings());

    if let Some(path) = &args.report {
        report::RunReport::build(&session).save_to_file(path)?;
        log::info!("Report written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
