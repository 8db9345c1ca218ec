use clap::{Parser, Subcommand};
use podi::host::{Bank, Podi, SplitImage, TickLimit, VirtualResetLine};
use podi::link::QueueTransport;
use podi::sqi::SqiClient;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

//===========================================================================//

macro_rules! invalid_data {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         format!($fmt, $($arg)+)))
    };
}

//===========================================================================//

#[derive(Parser)]
#[clap(author, about, long_about = None, version)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Writes the host command stream that flashes a binary.
    Encode {
        /// The binary to flash, made of big-endian 16-bit words.
        binary: PathBuf,
        /// Where to write the command stream (default: stdout).
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Services host commands, with host output on stdout.
    Serve {
        /// File to read host commands from (default: stdin).
        #[clap(short, long)]
        input: Option<PathBuf>,
        /// Number of tick rounds each run command lasts.
        #[clap(long, default_value_t = 1_000_000)]
        run_ticks: u64,
    },
    /// Flashes a binary into simulated memories, then reads it back over SQI.
    Check {
        /// The binary to flash, made of big-endian 16-bit words.
        binary: PathBuf,
    },
}

//===========================================================================//

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Encode { binary, output } => {
            let image = read_image(&binary)?;
            let stream = image.flash_command();
            match output {
                Some(path) => fs::write(path, stream)?,
                None => io::stdout().lock().write_all(&stream)?,
            }
        }
        Command::Serve { input, run_ticks } => {
            let input: Box<dyn Read> = match input {
                Some(path) => Box::new(io::BufReader::new(File::open(path)?)),
                None => Box::new(io::stdin().lock()),
            };
            let mut podi = new_podi();
            podi.serve(input, io::stdout().lock(), TickLimit::new(run_ticks))?;
        }
        Command::Check { binary } => {
            let image = read_image(&binary)?;
            check_image(&image)?;
        }
    }
    Ok(())
}

fn new_podi() -> Podi<QueueTransport, VirtualResetLine> {
    Podi::new(
        QueueTransport::new(),
        QueueTransport::new(),
        VirtualResetLine::new(),
    )
}

fn read_image(path: &Path) -> io::Result<SplitImage> {
    let binary = fs::read(path)?;
    match SplitImage::from_binary(&binary) {
        Ok(image) => Ok(image),
        Err(error) => invalid_data!("{}: {}", path.display(), error),
    }
}

fn check_image(image: &SplitImage) -> io::Result<()> {
    let mut podi = new_podi();
    let mut replies = Vec::<u8>::new();
    let stream = image.flash_command();
    podi.serve(stream.as_slice(), &mut replies, TickLimit::new(0))?;
    print!("{}", String::from_utf8_lossy(&replies));
    let client = SqiClient::new();
    let mut mismatches = 0;
    for (bank, expected) in [(Bank::Lo, &image.lo), (Bank::Hi, &image.hi)] {
        let memory = podi.memory_mut(bank);
        let actual = match client.read(memory, 0, expected.len()) {
            Ok(actual) => actual,
            Err(error) => invalid_data!("memory {}: {}", bank.index(), error),
        };
        for (addr, (&want, &got)) in expected.iter().zip(&actual).enumerate() {
            if want != got {
                println!(
                    "Memory {}: 0x{addr:04x}: expected 0x{want:02x}, read \
                     0x{got:02x}",
                    bank.index()
                );
                mismatches += 1;
            }
        }
    }
    if mismatches > 0 {
        invalid_data!("{} bytes did not read back", mismatches);
    }
    println!("Read back {} bytes from each memory.", image.len());
    Ok(())
}

//===========================================================================//
