pub mod cli;
pub mod doc;
pub mod leaf;
pub mod options;
pub mod render;
pub mod resolve;
pub mod schema;
pub mod value;

use colored::Colorize;

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("{}", format!("error: {error:#}").red());
        std::process::exit(1);
    }
}

// ------------------------------- Tests ------------------------------------ //
