//! Non-interactive command line over the JSON-backed [`PaymentDesk`].

pub mod output;

use std::{
    ffi::OsString,
    io::{self, Write},
    path::PathBuf,
};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use costbook_domain::{PaymentStatus, ReportFilter};
use uuid::Uuid;

use crate::{
    errors::{CostbookError, Result},
    PaymentDesk,
};
use output::Palette;

#[derive(Parser, Debug)]
#[command(name = "costbook_cli", version, about = "Inspect cost-item payment ledgers")]
pub struct Cli {
    /// Data directory; overrides COSTBOOK_HOME
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the payments of one cost item
    Payments { ledger_id: Uuid },

    /// Payments across cost items, grouped by status
    Report {
        #[arg(long)]
        status: Option<PaymentStatus>,
        /// Earliest payment date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest payment date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        project: Option<Uuid>,
    },

    /// List cost items with their paid totals
    Items {
        #[arg(long)]
        project: Option<Uuid>,
    },
}

impl Command {
    fn report_filter(&self) -> Option<ReportFilter> {
        let Command::Report {
            status,
            from,
            to,
            project,
        } = self
        else {
            return None;
        };
        Some(ReportFilter {
            status: *status,
            date_from: *from,
            date_to: *to,
            project_id: *project,
        })
    }
}

pub fn run_cli() -> Result<()> {
    let stdout = io::stdout();
    run_cli_with(std::env::args_os(), &mut stdout.lock())
}

/// Parses `args` and writes the command's output to `out`.
pub fn run_cli_with<I, T, W>(args: I, out: &mut W) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            write!(out, "{err}")?;
            return Ok(());
        }
        Err(err) => {
            let message = err.to_string();
            let message = message.trim().trim_start_matches("error: ");
            return Err(CostbookError::InvalidInput(message.to_string()));
        }
    };

    let desk = match &cli.home {
        Some(home) => PaymentDesk::open(home.clone())?,
        None => PaymentDesk::from_env()?,
    };
    let palette = Palette::detect(&desk.config().currency);

    let rendered = match &cli.command {
        Command::Payments { ledger_id } => {
            let ledger = desk.cost_item(*ledger_id)?;
            let snapshot = desk.list_payments(*ledger_id)?;
            if cli.json {
                to_json(&snapshot)?
            } else {
                output::render_payments(&ledger, &snapshot, &palette)?
            }
        }
        command @ Command::Report { .. } => {
            let filter = command.report_filter().unwrap_or_default();
            let report = desk.generate_report(&filter)?;
            if cli.json {
                to_json(&report)?
            } else {
                output::render_report(&report, &palette)?
            }
        }
        Command::Items { project } => {
            let ledgers = desk.cost_items(*project)?;
            if cli.json {
                to_json(&ledgers)?
            } else {
                output::render_items(&ledgers, &palette)?
            }
        }
    };

    out.write_all(rendered.as_bytes())?;
    if cli.json {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CostbookError::Core(costbook_core::CoreError::Serde(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_flags_build_filter() {
        let cli = Cli::try_parse_from([
            "costbook_cli",
            "report",
            "--status",
            "overdue",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ])
        .unwrap();
        let filter = cli.command.report_filter().unwrap();
        assert_eq!(filter.status, Some(PaymentStatus::Overdue));
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert!(filter.project_id.is_none());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut sink = Vec::new();
        let err = run_cli_with(["costbook_cli", "report", "--status", "late"], &mut sink)
            .unwrap_err();
        assert!(matches!(err, CostbookError::InvalidInput(_)));
    }

    #[test]
    fn help_is_written_to_output() {
        let mut sink = Vec::new();
        run_cli_with(["costbook_cli", "--help"], &mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("payments"));
        assert!(text.contains("report"));
    }
}
