use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use serde::Deserialize;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::debug;

use oddsmith::confidence;
use oddsmith::derive::derive_markets;
use oddsmith::calibrate::apply::CalibratedMarkets;
use oddsmith::domain::{AuxStrength, ForecastDistribution};
use oddsmith::print;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the forecast from
    #[clap(short = 'f', long)]
    file: PathBuf,

    /// ELO-like strength differential, enabling corner/card heuristics
    #[clap(long = "elo-diff")]
    elo_diff: Option<f64>,

    /// emit the wire-format JSON map instead of a table
    #[clap(long)]
    json: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if let Some(elo_diff) = self.elo_diff {
            if !elo_diff.is_finite() {
                bail!("--elo-diff must be finite");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ForecastFile {
    #[serde(rename = "pHome")]
    p_home: f64,
    #[serde(rename = "pDraw")]
    p_draw: f64,
    #[serde(rename = "pAway")]
    p_away: f64,
    scores: BTreeMap<String, f64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let contents = fs::read_to_string(&args.file)?;
    let file: ForecastFile = serde_json::from_str(&contents)?;
    let forecast = ForecastDistribution {
        p_home: file.p_home,
        p_draw: file.p_draw,
        p_away: file.p_away,
        scores: file.scores.into_iter().collect(),
    };
    forecast.validate()?;

    let aux = args.elo_diff.map(|elo_diff| AuxStrength { elo_diff });
    let markets = derive_markets(&forecast, aux.as_ref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&markets)?);
    } else {
        let table = print::tabulate_markets(&markets);
        println!("{}", Console::default().render(&table));
    }

    let uncalibrated = CalibratedMarkets {
        markets,
        calibrated: Default::default(),
    };
    let score = confidence::estimate(&uncalibrated);
    println!("confidence: {:.2} ({:?})", score.value, score.label);
    Ok(())
}
