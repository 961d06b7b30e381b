use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{error, info, LevelFilter};

use geosmiles::config::{Emit, Options};
use geosmiles::pipeline::smiles_for_file;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Infer bonds and charges from extended-XYZ coordinates and print canonical SMILES.
///
/// Each covalent-radius multiplier is tried in turn, and every one that yields
/// a single, valence-consistent molecule prints a line.
struct Arguments {
    /// Extended-XYZ files, processed in order.
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Total molecular charge.
    #[arg(short, long, allow_negative_numbers = true)]
    charge: Option<i32>,
    /// Covalent-radius multipliers, comma separated, tried in order.
    #[arg(long, value_delimiter = ',')]
    factors: Option<Vec<f64>>,
    /// Neighbor-list skin in ångström.
    #[arg(long)]
    skin: Option<f64>,
    /// Print only the first multiplier that succeeds.
    #[arg(long)]
    first_factor: bool,
    /// Process every frame of each file instead of only the first.
    #[arg(long)]
    all_frames: bool,
    /// Fold hydrogens into their neighbors' counts instead of writing `[H]` atoms.
    #[arg(long)]
    fold_hydrogens: bool,
    /// Skip tetrahedral and double-bond stereo.
    #[arg(long)]
    no_stereo: bool,
    /// Express valence deficits as radicals instead of formal charges.
    #[arg(long)]
    no_charged_fragments: bool,
    /// JSON file with option overrides; flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Arguments {
    fn options(&self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Options::default(),
        };
        if let Some(charge) = self.charge {
            options.charge = charge;
        }
        if let Some(factors) = &self.factors {
            options.factors = factors.clone();
        }
        if let Some(skin) = self.skin {
            options.skin = skin;
        }
        if self.first_factor {
            options.emit = Emit::First;
        }
        if self.fold_hydrogens {
            options.explicit_hydrogens = false;
        }
        if self.no_stereo {
            options.embed_chiral = false;
        }
        if self.no_charged_fragments {
            options.allow_charged_fragments = false;
        }
        Ok(options)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn process(path: &Path, options: &Options, all_frames: bool) -> Result<()> {
    let frames = smiles_for_file(path, options, all_frames)
        .with_context(|| format!("reading {}", path.display()))?;
    for (index, smiles) in frames.iter().enumerate() {
        if smiles.is_empty() {
            info!("{} frame {index}: no multiplier gave a molecule", path.display());
        }
        for s in smiles {
            println!("{s}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.verbose);

    let options = match args.options() {
        Ok(options) => options,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    for path in &args.files {
        if let Err(e) = process(path, &options, args.all_frames) {
            error!("{e:#}");
            failed = true;
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
