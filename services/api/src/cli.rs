use crate::demo::{
    run_demo, run_planning_review, run_timesheet, DemoArgs, PlanningReviewArgs, TimesheetArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use staffing_planner::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Staffing Planner",
    about = "Serve and inspect consultant planning, timesheets and lead staffing",
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
    /// Print planning views from the demo directory and an optional staffing CSV
    Planning {
        #[command(subcommand)]
        command: PlanningCommand,
    },
    /// Walk a lead from qualification to win and show the resulting planning
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum PlanningCommand {
    /// Multi-month planning review grouped by manager or position
    Review(PlanningReviewArgs),
    /// Monthly timesheet of a single consultant
    Timesheet(TimesheetArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Start with the demo consultants, missions and staffing loaded
    #[arg(long)]
    pub(crate) demo_data: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Planning {
            command: PlanningCommand::Review(args),
        } => run_planning_review(args),
        Command::Planning {
            command: PlanningCommand::Timesheet(args),
        } => run_timesheet(args),
        Command::Demo(args) => run_demo(args),
    }
}
