use crate::commands::{
    run_accept, run_apply, run_complete_profile, run_courses, AcceptArgs, ApplyArgs,
    CompleteProfileArgs, CoursesArgs,
};
use crate::server;
use admissions_portal::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Admissions Portal",
    about = "Serve the course catalog and drive the admissions workflows from the command line",
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
    /// List the programmes open for applications
    Courses(CoursesArgs),
    /// Fill in the three-step application and submit it
    Apply(ApplyArgs),
    /// Accept an application using the token from the admin email
    Accept(AcceptArgs),
    /// Complete a student profile using the token from the acceptance email
    CompleteProfile(CompleteProfileArgs),
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
        Command::Courses(args) => run_courses(args),
        Command::Apply(args) => run_apply(args).await,
        Command::Accept(args) => run_accept(args).await,
        Command::CompleteProfile(args) => run_complete_profile(args).await,
    }
}
