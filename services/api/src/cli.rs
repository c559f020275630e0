use crate::demo::{run_attendance_summary, run_demo, AttendanceSummaryArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use guild_loot::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Guild Loot Priority",
    about = "Run the guild loot priority service or explore it from the command line",
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
    /// Work with officer attendance exports
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommand,
    },
    /// Walk a seeded guild through validation, scoring and the priority board
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum AttendanceCommand {
    /// Import a CSV export and print each member's attendance contribution
    Summary(AttendanceSummaryArgs),
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
        Command::Attendance {
            command: AttendanceCommand::Summary(args),
        } => run_attendance_summary(args),
        Command::Demo(args) => run_demo(args),
    }
}
