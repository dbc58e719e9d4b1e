use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shiftdesk::cli::{
    coverage, read_json, render_catalog, render_coverage, slots_from_definitions, validate,
};
use shiftdesk::shiftdesk_core::PermissionCatalog;
use shiftdesk::shiftdesk_models::schedule::{
    CreateShiftSlotDto, EmployeeAvailability, ProposedShift,
};

#[derive(Parser)]
#[command(name = "shiftdesk-cli")]
#[command(about = "Shiftdesk CLI - offline permission and schedule tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the permission catalog and role defaults
    Catalog,
    /// Validate a proposed schedule against employee availability
    Validate {
        /// JSON array of shifts: employee_id, day, start_time, end_time
        #[arg(short = 's', long)]
        shifts: PathBuf,

        /// JSON array of employees: id, full_name, availability
        #[arg(short = 'e', long)]
        employees: PathBuf,
    },
    /// Report slot coverage of a schedule
    Coverage {
        /// JSON array of shifts: employee_id, day, start_time, end_time
        #[arg(short = 's', long)]
        shifts: PathBuf,

        /// JSON array of slots: day_of_week, slot_name, start_time, end_time, required_count
        #[arg(long)]
        slots: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog => {
            print!("{}", render_catalog(&PermissionCatalog::standard()));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { shifts, employees } => {
            let shifts: Vec<ProposedShift> = read_json(&shifts)?;
            let employees: Vec<EmployeeAvailability> = read_json(&employees)?;

            let report = validate(&shifts, &employees);
            println!("{}", serde_json::to_string_pretty(&report)?);

            Ok(if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Coverage { shifts, slots } => {
            let shifts: Vec<ProposedShift> = read_json(&shifts)?;
            let definitions: Vec<CreateShiftSlotDto> = read_json(&slots)?;
            let slots = slots_from_definitions(definitions)?;

            print!("{}", render_coverage(&coverage(&shifts, &slots)));
            Ok(ExitCode::SUCCESS)
        }
    }
}
