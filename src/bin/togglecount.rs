//! Single-trace toggle counting.
//!
//! This program parses one VCD file and prints the toggle
//! count of every declared signal.
//!
//! It can optionally persist the counts as a toggle database
//! file, building on a previous database, so several testbench
//! traces accumulate into one activity profile.

use togglediff::ToggleDB;
use ciborium::{ from_reader, into_writer };
use std::fs::File;

#[derive(clap::Parser, Debug)]
struct ToggleCountArgs {
    /// The input vcd file path
    vcd: String,
    /// The database output file path.
    #[clap(long)]
    db_output: Option<String>,
    /// The optional previous database path.
    ///
    /// If not specified, counting starts from an empty
    /// database.
    #[clap(long)]
    db_input: Option<String>,
}

fn main() {
    clilog::init_stderr_color_debug();
    let args = <ToggleCountArgs as clap::Parser>::parse();
    println!("args: {:?}", args);
    let mut db: ToggleDB = match &args.db_input {
        Some(dbpath) => from_reader(
            File::open(dbpath).unwrap()
        ).unwrap(),
        None => ToggleDB::new()
    };
    db.feed_vcd(&args.vcd).unwrap();
    println!("{:<20} {:>10}", "Signal", "Toggles");
    for (name, count) in db.toggles.iter() {
        println!("{:<20} {:>10}", name, count);
    }
    if let Some(db_output) = &args.db_output {
        into_writer(
            &db,
            File::create(db_output).unwrap()
        ).unwrap();
    }
}
