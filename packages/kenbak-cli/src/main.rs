use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kenbak_core::cpu::{Kenbak, StepOutcome};
use kenbak_core::error::KenbakError;
use kenbak_core::host::RealTimeHost;
use kenbak_core::memory::P_ADDR;

#[derive(Parser)]
#[command(name = "kenbak-cli", about = "A terminal host for the KENBAK-1 emulator core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Loads a program image and runs it to completion.
    Run {
        image: PathBuf,
        /// Run at full speed instead of pacing to ~1000 instructions/sec.
        #[arg(long)]
        no_throttle: bool,
        /// Stop after this many instructions even if the program hasn't halted.
        #[arg(long)]
        max_instructions: Option<u64>,
    },
    /// Loads a program image and prints the 256-byte memory dump, without running it.
    Dump { image: PathBuf },
}

fn load_image(path: &PathBuf) -> anyhow::Result<[u8; 256]> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if bytes.len() > 256 {
        return Err(KenbakError::ImageTooLarge { len: bytes.len() }.into());
    }
    let mut image = [0u8; 256];
    image[..bytes.len()].copy_from_slice(&bytes);
    Ok(image)
}

fn print_dump(memory: &[u8; 256]) {
    for (row, chunk) in memory.chunks(16).enumerate() {
        print!("{:#04x}: ", row * 16);
        for byte in chunk {
            print!("{byte:02x} ");
        }
        println!();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Dump { image } => {
            let bytes = load_image(&image)?;
            log::info!("loaded {}", image.display());
            print_dump(&bytes);
        }
        Command::Run {
            image,
            no_throttle,
            max_instructions,
        } => {
            let bytes = load_image(&image)?;
            log::info!("loaded {}", image.display());

            let mut cpu = Kenbak::new();
            cpu.load(&bytes);

            if no_throttle {
                let mut host = kenbak_core::host::NullHost;
                run_with_limit(&mut cpu, &mut host, max_instructions);
            } else {
                let mut host = RealTimeHost::new();
                run_with_limit(&mut cpu, &mut host, max_instructions);
            }

            println!(
                "halted: P={:#04x} A={:#04x} B={:#04x} X={:#04x} OUTPUT={:#04x}",
                cpu.p(),
                cpu.a(),
                cpu.b(),
                cpu.x(),
                cpu.output(),
            );
        }
    }

    Ok(())
}

fn run_with_limit(cpu: &mut Kenbak, host: &mut impl kenbak_core::host::Host, max: Option<u64>) {
    let max = match max {
        Some(max) => max,
        None => {
            cpu.run(host);
            return;
        }
    };

    cpu.poke(P_ADDR, kenbak_core::memory::PROGRAM_START);
    let mut executed = 0u64;
    loop {
        if host.stop_requested() || executed >= max {
            log::info!("stopping after {executed} instructions");
            break;
        }
        match cpu.step(host) {
            StepOutcome::Halted => break,
            StepOutcome::Continued => {}
        }
        executed += 1;
    }
}
