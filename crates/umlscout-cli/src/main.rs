//! umlscout CLI - Turn C++, Unreal and C# sources into UML class diagrams

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    // Logging is initialised inside run() once flags and environment are known
    let mut app = cli::UmlScoutApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
