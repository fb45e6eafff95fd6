//! Inspects how a MIDI file maps onto stage instruments.
//!
//! Prints the assigned roster and, on request, a character-grid timeline of
//! instrument visibility over the course of the song.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use jamstage::instrument::Role;
use jamstage::midi::load_sequence;
use jamstage::stage::Stage;

#[derive(Parser, Debug)]
#[command(version, about = "Inspect instrument assignment for a MIDI file")]
struct Opt {
    /// Path to a Standard MIDI File
    midi: PathBuf,

    /// Print a visibility timeline grid
    #[arg(long)]
    timeline: bool,

    /// Seconds per timeline column
    #[arg(long, default_value_t = 1.0)]
    step: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::parse();

    let bytes = fs::read(&opt.midi)
        .with_context(|| format!("failed to read {}", opt.midi.display()))?;
    let sequence = load_sequence(&bytes)
        .with_context(|| format!("failed to parse {}", opt.midi.display()))?;

    let mut stage = Stage::new(&sequence, |_| {});

    println!("{}", opt.midi.display());
    println!(
        "{} instruments, {:.1}s",
        stage.instruments().len(),
        stage.duration()
    );
    println!();

    for instrument in stage.instruments() {
        println!(
            "  ch{:2}  {}",
            instrument.channel(),
            role_name(instrument.role())
        );
    }

    if opt.timeline {
        println!();
        print_timeline(&mut stage, opt.step);
    }

    Ok(())
}

fn role_name(role: Role) -> String {
    match role {
        Role::Melodic(spec) => format!("{spec:?}"),
        Role::Kit(variant) => format!("DrumKit({variant:?})"),
        Role::Special(spec) => format!("{spec:?}"),
        Role::Auxiliary(voice) => format!("{voice:?}"),
    }
}

/// One row per instrument, one column per `step` seconds; `#` marks the
/// spans where the instrument is on stage.
fn print_timeline(stage: &mut Stage, step: f64) {
    let duration = stage.duration();
    let columns = (duration / step).ceil() as usize + 1;

    let mut rows = vec![String::new(); stage.instruments().len()];
    stage.seek(0.0);
    for column in 0..columns {
        let time = column as f64 * step;
        stage.tick(time, step);
        for (row, instrument) in rows.iter_mut().zip(stage.instruments()) {
            row.push(if instrument.is_visible() { '#' } else { '.' });
        }
    }

    let width = stage
        .instruments()
        .iter()
        .map(|i| role_name(i.role()).len())
        .max()
        .unwrap_or(0);
    for (row, instrument) in rows.iter().zip(stage.instruments()) {
        println!("  {:width$}  {}", role_name(instrument.role()), row);
    }
}
