mod commands;
mod report;
mod terminal;

use commands::{CommandLine, Commands};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    logging::init(cli.quiet);

    match cli.command {
        Commands::Probe(args) => {
            print::header("fleet connectivity probe", cli.quiet);
            commands::probe::probe(args, cli.quiet).await
        }
        Commands::Suspend(args) => {
            print::header("suspending scaling groups", cli.quiet);
            commands::suspend::suspend(args).await
        }
        Commands::Resume(args) => {
            print::header("resuming scaling groups", cli.quiet);
            commands::resume::resume(args).await
        }
    }
}
