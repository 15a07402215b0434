use crate::server;
use crate::terminal::{run_catalog, run_score, run_take, ScoreArgs, TakeArgs};
use clap::{Args, Parser, Subcommand};
use data_maturity::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Data Maturity Survey",
    about = "Serve or take the data maturity assessment from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Take the assessment interactively in the terminal
    Take(TakeArgs),
    /// Score a set of answers given as option numbers
    Score(ScoreArgs),
    /// Print the question catalog and tier thresholds
    Catalog,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Take(args) => run_take(args).await,
        Command::Score(args) => run_score(args),
        Command::Catalog => run_catalog(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from(["data-maturity-api", "score", "--choices", "1,2,3,4,1,2,3"])
            .expect("score parses");
        assert!(matches!(
            cli.command,
            Some(Command::Score(ScoreArgs { ref choices, json: false })) if choices == "1,2,3,4,1,2,3"
        ));

        let cli = Cli::try_parse_from(["data-maturity-api", "take", "--skip-intake"])
            .expect("take parses");
        assert!(matches!(
            cli.command,
            Some(Command::Take(TakeArgs { skip_intake: true, csv: None }))
        ));

        let cli = Cli::try_parse_from(["data-maturity-api"]).expect("bare invocation parses");
        assert!(cli.command.is_none());
    }
}
