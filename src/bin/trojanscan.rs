//! Switching-activity screening of two traces.
//!
//! This program reads two VCD traces of the same design: a
//! clean (golden) reference and a candidate suspected of
//! carrying extra logic. It compares per-signal toggle counts
//! and reports every signal whose switching activity deviates
//! beyond a threshold.
//!
//! The scored records can optionally be exported for the chart
//! renderer.

use togglediff::{ compare_toggles, ToggleDB };
use togglediff::compare::{ PlotInput, DEFAULT_THRESHOLD };
use ciborium::into_writer;
use std::fs::File;
use itertools::Itertools;

#[derive(clap::Parser, Debug)]
struct TrojanScanArgs {
    /// The clean (reference) trace VCD path
    clean_vcd: String,
    /// The candidate trace VCD path
    trojan_vcd: String,
    /// The deviation percentage above which a signal is
    /// flagged as suspicious.
    #[clap(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
    /// Optional output path for the scored records
    /// (CBOR, the chart renderer input).
    #[clap(long)]
    export: Option<String>,
    /// Fail if any signal is present in only one of the two
    /// traces.
    #[clap(long)]
    strict: bool,
}

fn main() {
    clilog::init_stderr_color_debug();
    let args = <TrojanScanArgs as clap::Parser>::parse();
    println!("args: {:#?}", args);

    let mut clean = ToggleDB::new();
    clean.feed_vcd(&args.clean_vcd).unwrap();
    let mut trojan = ToggleDB::new();
    trojan.feed_vcd(&args.trojan_vcd).unwrap();

    let cmp = compare_toggles(&clean, &trojan);

    println!("{:<20} {:>10} {:>10} {:>12}   {}",
             "Signal", "Clean", "Trojan", "Deviation%",
             "Status");
    let mut suspicious = Vec::new();
    for d in cmp.deviations.iter() {
        let status = if d.is_suspicious(args.threshold) {
            suspicious.push(&d.name);
            "SUSPICIOUS"
        }
        else {
            "normal"
        };
        println!("{:<20} {:>10} {:>10} {:>11.2}%   {}",
                 d.name, d.clean, d.trojan, d.deviation_pct,
                 status);
    }
    println!("suspicious signals: {}", suspicious.len());
    if !suspicious.is_empty() {
        println!("flagged: {}", suspicious.iter().format(", "));
    }

    if let Some(export) = &args.export {
        let plot = PlotInput {
            threshold: args.threshold,
            deviations: cmp.deviations,
        };
        into_writer(
            &plot,
            File::create(export).unwrap()
        ).unwrap();
        println!("exported scored records to {}", export);
    }

    if args.strict && !(cmp.clean_only.is_empty()
                        && cmp.trojan_only.is_empty()) {
        clilog::error!(
            TGDF_STRICT,
            "strict mode: {} signals present in only one trace",
            cmp.clean_only.len() + cmp.trojan_only.len()
        );
        std::process::exit(1);
    }
}
