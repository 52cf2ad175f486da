use agenda::cli::{CliCommand, parse_args, print_help};
use agenda::context::StandardContext;
use anyhow::Result;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    rust_i18n::set_locale("pt-BR");
    let args: Vec<String> = env::args().skip(1).collect();

    let parsed = match parse_args(&args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!();
            print_help("agenda");
            std::process::exit(2);
        }
    };

    match parsed.command {
        CliCommand::Help => {
            print_help("agenda");
            Ok(())
        }
        CliCommand::Tui => {
            let ctx = StandardContext::new(parsed.root);
            agenda::tui::run(&ctx).await
        }
        _ => agenda::cli::run(parsed).await,
    }
}
