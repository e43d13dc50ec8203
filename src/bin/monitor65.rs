//! Headless driver for `monitor65`: boots a [`Machine`], feeds it a ROM,
//! optionally types a file into the keyboard FIFO, then runs it for a
//! fixed instruction budget and dumps the screen. Not a terminal UI (no
//! raw mode, no redraw loop), just a scriptable harness for exercising
//! the core from a shell.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use monitor65::filestore::DirFileStore;
use monitor65::kernel::rom_image;
use monitor65::rom::{RomImage, SegmentSpec, CODE, JUMPS, VECS};
use monitor65::Machine;

/// Run the synthesized (or a supplied) 6502 monitor kernel headlessly.
#[derive(Parser, Debug)]
#[command(name = "monitor65", version, about)]
struct Cli {
    /// Path to a 4096-byte ROM blob, or "builtin" for the built-in
    /// synthesized monitor kernel.
    #[arg(long, default_value = "builtin")]
    rom: String,

    /// Directory the `L:` command loads files from. Defaults to the
    /// current directory.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Type the contents of this file into the keyboard FIFO, one
    /// character per tick, before the run budget starts counting.
    #[arg(long)]
    r#type: Option<PathBuf>,

    /// Number of CPU steps to run.
    #[arg(long, default_value_t = 200_000)]
    steps: u32,

    /// Print a register snapshot to stderr after every step.
    #[arg(long, default_value_t = false)]
    trace: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let rom = load_rom(&cli.rom)?;
    let mut machine = Machine::new(Box::new(DirFileStore::new(cli.dir.clone())));
    machine
        .power_on(&rom)
        .context("failed to power on the machine")?;

    if let Some(path) = &cli.r#type {
        let text = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        for &b in &text {
            machine.cpu.bus.pia_mut().enqueue_key(b);
            machine.run(1);
        }
    }

    let ran = if cli.trace {
        let mut ran = 0;
        for _ in 0..cli.steps {
            if machine.run(1) == 0 {
                break;
            }
            eprintln!("{}", machine.cpu.state);
            ran += 1;
        }
        ran
    } else {
        machine.run(cli.steps)
    };
    info!("ran {ran} steps");
    print_screen(&machine);
    Ok(())
}

fn load_rom(spec: &str) -> Result<RomImage> {
    if spec == "builtin" {
        return Ok(rom_image::synthesized());
    }
    let blob = fs::read(spec).with_context(|| format!("reading ROM image {spec}"))?;
    let specs = [
        SegmentSpec {
            name: CODE,
            start: 0xF000,
            end: 0xFEFF,
        },
        SegmentSpec {
            name: JUMPS,
            start: 0xFF00,
            end: 0xFF11,
        },
        SegmentSpec {
            name: VECS,
            start: 0xFFFA,
            end: 0xFFFF,
        },
    ];
    RomImage::from_blob(&blob, &specs).context("parsing ROM image")
}

fn print_screen(machine: &Machine) {
    use monitor65::devices::screen::{COLUMNS, ROWS};
    let screen = machine.cpu.bus.screen();
    for row in 0..ROWS as u8 {
        let mut line = String::with_capacity(COLUMNS);
        for col in 0..COLUMNS as u8 {
            let byte = screen.char_at(col, row);
            line.push(if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            });
        }
        println!("{line}");
    }
}
