use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use packdata::{AppError, ForbiddenImports};

#[derive(Parser)]
#[command(name = "packdata")]
#[command(version)]
#[command(
    about = "Resolve bundled data resources and guard against forbidden imports",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the on-disk path of a bundled resource
    Resolve {
        /// Resource name relative to the data root, e.g. "nipreps.json"
        name: String,
    },
    /// Scan a source tree for imports of banned crates
    Lint {
        /// Root directory to scan
        root: PathBuf,
        /// Crate name to ban (repeatable)
        #[arg(short, long = "ban", required = true)]
        ban: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve { name } => resolve(&name),
        Commands::Lint { root, ban } => lint(&root, ban),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(match e.kind() {
            ErrorKind::NotFound => 2,
            _ => 1,
        });
    }
}

fn resolve(name: &str) -> Result<(), AppError> {
    let path = packdata::load_resource(name)?;
    println!("{}", path.display());
    Ok(())
}

fn lint(root: &Path, ban: Vec<String>) -> Result<(), AppError> {
    let offenders = ForbiddenImports::new(ban).scan(root)?;
    if offenders.is_empty() {
        return Ok(());
    }
    for offender in &offenders {
        eprintln!("{}:{}", offender.file.display(), offender.line);
    }
    std::process::exit(1);
}
