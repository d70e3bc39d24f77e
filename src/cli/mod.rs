pub mod classify;
pub mod compare;
pub mod init;
pub mod inspect;
pub mod status;

use clap::{Args, Parser, Subcommand};

use crate::settings::{ReasonStyle, Settings, SheetPolicy, WhitespaceRule};

#[derive(Parser)]
#[command(
    name = "sheetrecon",
    version,
    about = "Reconcile an output spreadsheet against its template, cell by cell."
)]
pub struct Cli {
    /// Show debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Per-run overrides of the saved settings.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Which sheets to compare
    #[arg(long = "sheet-policy", value_enum)]
    pub sheet_policy: Option<SheetPolicy>,
    /// Whitespace cleanup applied to text before comparing
    #[arg(long, value_enum)]
    pub whitespace: Option<WhitespaceRule>,
    /// Detail level of mismatch reasons
    #[arg(long, value_enum)]
    pub reasons: Option<ReasonStyle>,
    /// Row holding the column headers (1-based)
    #[arg(long = "header-row", value_parser = clap::value_parser!(u32).range(1..))]
    pub header_row: Option<u32>,
}

impl PolicyArgs {
    /// Overwrite the settings fields that were given on the command line.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(p) = self.sheet_policy {
            settings.sheet_policy = p;
        }
        if let Some(w) = self.whitespace {
            settings.whitespace = w;
        }
        if let Some(r) = self.reasons {
            settings.reasons = r;
        }
        if let Some(h) = self.header_row {
            settings.header_row = h;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare OUTPUT against TEMPLATE and write a scored report.
    Compare {
        /// Source-of-truth workbook
        template: String,
        /// Workbook under test
        output: String,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Report path (default: <report_dir>/Test_Report_<date>.xlsx)
        #[arg(long)]
        report: Option<String>,
        /// Skip writing the report workbook
        #[arg(long = "no-report", conflicts_with = "report")]
        no_report: bool,
        /// Print the verdict ledger and summary as JSON instead of tables
        #[arg(long)]
        json: bool,
        /// Only list cells with a mismatch
        #[arg(long = "wrong-only")]
        wrong_only: bool,
    },
    /// Show the data-type tag for one or more number-format strings.
    Classify {
        /// Format strings, e.g. '0.00%' or '$#,##0.00'
        #[arg(required = true)]
        formats: Vec<String>,
    },
    /// List sheets and their extents in a workbook.
    Inspect {
        /// Workbook to inspect
        file: String,
    },
    /// Save default comparison settings.
    Init {
        #[command(flatten)]
        policy: PolicyArgs,
        /// Directory for generated reports
        #[arg(long = "report-dir")]
        report_dir: Option<String>,
    },
    /// Show current settings.
    Status,
}
