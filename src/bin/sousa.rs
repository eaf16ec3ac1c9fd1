#[cfg(feature = "cli")]
mod real {
    use anyhow::Result;
    use clap::error::ErrorKind;
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Parser)]
    #[command(
        name = "sousa",
        about = "Sousa is an SLR(1) parsing-table generator",
        long_about = "Sousa reads a BNF grammar and writes the production, action, and goto \
                      tables of its SLR(1) parser into the current directory."
    )]
    struct Args {
        /// Path to the grammar file
        grammar: PathBuf,
    }

    pub fn main() -> Result<()> {
        env_logger::init();
        let args = match Args::try_parse() {
            Ok(args) => args,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.exit()
            }
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        };
        sousa::generate(&args.grammar)
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    real::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("sousa disabled (compiled without `cli` feature)");
}
