mod cmd;
mod config;

use anyhow::Result;
use clap::Command;

fn cli() -> Command {
    Command::new("folio")
        .about("Turn a directory of markdown docs into a navigable documentation site")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        _ => unreachable!("subcommand required"),
    }
}
