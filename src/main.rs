use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use sound_score::disassembler::Disassembler;
use sound_score::emit::emit_score;
use sound_score::{extract, RomFile, RomLayout, ScoreError, SoundTable};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// sound-score - extract unrolled sound scores from the td1_4.1k ROM
#[derive(Parser)]
#[command(name = "sound-score")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unroll every part and write the scores as Rust source
    Extract {
        #[command(flatten)]
        rom: RomArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the sound directory and each sound's part references
    List {
        #[command(flatten)]
        rom: RomArgs,
    },

    /// Print a linear listing of the part at ADDR
    Disasm {
        #[command(flatten)]
        rom: RomArgs,

        /// Part address in hex, with or without 0x
        #[arg(value_parser = parse_hex_address)]
        addr: u16,
    },
}

#[derive(Args)]
struct RomArgs {
    /// ROM image (td1_4.1k)
    rom: PathBuf,

    /// TOML layout overriding the built-in addresses and opcodes
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Fail a part on its first invalid opcode instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Cap on decoded instructions per part
    #[arg(long, conflicts_with = "no_step_cap")]
    max_steps: Option<usize>,

    /// Walk parts without a step cap
    #[arg(long)]
    no_step_cap: bool,

    /// Skip the size and checksum check
    #[arg(long)]
    no_verify: bool,
}

impl RomArgs {
    fn layout(&self) -> Result<RomLayout, ScoreError> {
        let mut layout = match &self.layout {
            Some(path) => RomLayout::load(path)?,
            None => RomLayout::default(),
        };
        if self.strict {
            layout.strict = true;
        }
        if self.no_step_cap {
            layout.max_steps = None;
        } else if self.max_steps.is_some() {
            layout.max_steps = self.max_steps;
        }
        Ok(layout)
    }

    fn load(&self, layout: &RomLayout) -> Result<RomFile, ScoreError> {
        if self.no_verify {
            RomFile::open_unchecked(&self.rom, layout)
        } else {
            RomFile::open(&self.rom, layout)
        }
    }
}

fn parse_hex_address(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|_| format!("Invalid address: {}", s))
}

/// Load the layout and ROM, turning a missing or unreadable file into a readable message
fn open(args: &RomArgs) -> Result<(RomLayout, RomFile), Box<dyn std::error::Error>> {
    let layout = args.layout()?;
    debug!("Layout: {:?}", layout);

    match args.load(&layout) {
        Ok(rom) => Ok((layout, rom)),
        Err(ScoreError::Io(e)) => {
            match e.kind() {
                io::ErrorKind::NotFound => {
                    eprintln!("Error: ROM file not found: {}", args.rom.display());
                }
                io::ErrorKind::PermissionDenied => {
                    eprintln!(
                        "Error: Permission denied accessing ROM file: {}",
                        args.rom.display()
                    );
                }
                _ => {
                    eprintln!("Error: Cannot read ROM file '{}': {}", args.rom.display(), e);
                }
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { rom, output } => {
            let (layout, file) = open(&rom)?;
            let set = extract(&file.image(), &layout);
            info!(
                "Extracted {} sounds, {} parts ({} warnings, {} failures)",
                set.sounds.len(),
                set.parts.len(),
                set.warnings.len(),
                set.failures.len()
            );

            match output {
                Some(path) => {
                    let mut out = BufWriter::new(File::create(&path)?);
                    emit_score(&set, &mut out)?;
                    out.flush()?;
                }
                None => {
                    let stdout = io::stdout();
                    let mut out = stdout.lock();
                    emit_score(&set, &mut out)?;
                }
            }

            for failure in &set.failures {
                eprintln!("skipped {}", failure);
            }
        }
        Commands::List { rom } => {
            let (layout, file) = open(&rom)?;
            let table = SoundTable::new(file.image(), &layout);
            for (index, sound) in table.list_sounds() {
                match sound {
                    Ok(sound) => {
                        let refs: Vec<String> = sound
                            .part_refs
                            .iter()
                            .map(|r| format!("{:#06x}/{}", r.part_address, r.scale))
                            .collect();
                        println!(
                            "{:2}:{:#06x} {}",
                            index,
                            sound.list_address,
                            refs.join(" ")
                        );
                    }
                    Err(e) => println!("{:2}: <error: {}>", index, e),
                }
            }
        }
        Commands::Disasm { rom, addr } => {
            let (layout, file) = open(&rom)?;
            let disasm = Disassembler::new(file.image(), &layout.opcodes);
            print!("{}", disasm.listing(addr));
        }
    }

    Ok(())
}
