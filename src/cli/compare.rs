use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Color, Table};

use crate::cli::PolicyArgs;
use crate::engine::reconcile_files;
use crate::error::Result;
use crate::fmt::percent;
use crate::models::{DtypeResult, ValueResult, Verdict};
use crate::report::render_report;
use crate::settings::load_settings;
use crate::store::{ResultStore, Run};

pub struct CompareArgs {
    pub template: String,
    pub output: String,
    pub policy: PolicyArgs,
    pub report: Option<String>,
    pub no_report: bool,
    pub json: bool,
    pub wrong_only: bool,
}

fn default_report_path(report_dir: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%d-%m-%Y_%H-%M");
    PathBuf::from(report_dir).join(format!("Test_Report_{stamp}.xlsx"))
}

fn write_report(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

fn dtype_cell(v: &Verdict) -> Cell {
    let cell = Cell::new(v.dtype().label());
    match v.dtype() {
        DtypeResult::Correct => cell.fg(Color::Green),
        DtypeResult::Wrong => cell.fg(Color::Red),
        DtypeResult::NotApplicable => cell.fg(Color::DarkGrey),
    }
}

fn value_cell(v: &Verdict) -> Cell {
    let cell = Cell::new(v.value().label());
    match v.value() {
        ValueResult::Correct => cell.fg(Color::Green),
        ValueResult::Wrong => cell.fg(Color::Red),
    }
}

fn print_ledger(run: &Run, wrong_only: bool) {
    if run.result.is_empty() {
        println!("No populated template cells to compare.\n");
        return;
    }
    for name in run.result.sheet_names() {
        let Some(verdicts) = run.result.sheet(name) else {
            continue;
        };
        let rows: Vec<&Verdict> = verdicts
            .iter()
            .filter(|v| !wrong_only || !v.is_clean())
            .collect();
        if rows.is_empty() {
            continue;
        }
        let mut table = Table::new();
        table.set_header(vec!["Cell", "Field", "Expected", "Test", "Data Type", "Value", "Reason"]);
        for v in rows {
            let reason = if v.dtype() == DtypeResult::Wrong && v.value() == ValueResult::Correct {
                v.dtype_reason()
            } else {
                v.value_reason()
            };
            table.add_row(vec![
                Cell::new(v.cell()),
                Cell::new(v.field()),
                Cell::new(v.expected()),
                Cell::new(v.test()),
                dtype_cell(v),
                value_cell(v),
                Cell::new(reason),
            ]);
        }
        println!("{}\n{table}\n", name.bold());
    }
}

fn print_summary(run: &Run) {
    let s = &run.summary;
    let o = &s.overall;

    let accuracy = percent(s.accuracy(), 2);
    let accuracy = if o.value_wrong == 0 {
        accuracy.green().bold()
    } else {
        accuracy.red().bold()
    };

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Accuracy Score".bold()), Cell::new(accuracy)]);
    table.add_row(vec![Cell::new("Matching Cells"), Cell::new(o.value_correct)]);
    table.add_row(vec![Cell::new("Mismatched Cells"), Cell::new(o.value_wrong)]);
    table.add_row(vec![Cell::new("Data Type Correct"), Cell::new(o.dtype_correct)]);
    table.add_row(vec![Cell::new("Data Type Wrong"), Cell::new(o.dtype_wrong)]);
    table.add_row(vec![Cell::new("Data Type N/A"), Cell::new(o.dtype_not_applicable)]);
    table.add_row(vec![
        Cell::new("Data Type Accuracy"),
        Cell::new(percent(o.dtype_accuracy(), 2)),
    ]);
    table.add_row(vec![Cell::new("Total Checks"), Cell::new(o.total)]);
    println!("Reconciliation Summary\n{table}");

    if s.sheets.len() > 1 {
        let mut sheets = Table::new();
        sheets.set_header(vec!["Sheet", "Checks", "Matching", "Mismatched", "Accuracy"]);
        for sheet in &s.sheets {
            sheets.add_row(vec![
                Cell::new(&sheet.sheet),
                Cell::new(sheet.counts.total),
                Cell::new(sheet.counts.value_correct),
                Cell::new(sheet.counts.value_wrong),
                Cell::new(percent(sheet.counts.value_accuracy(), 1)),
            ]);
        }
        println!("\nBy Sheet\n{sheets}");
    }
}

pub fn run(args: CompareArgs) -> Result<()> {
    let mut settings = load_settings();
    args.policy.apply(&mut settings);
    let options = settings.options();

    let template = PathBuf::from(&args.template);
    let output = PathBuf::from(&args.output);
    let result = reconcile_files(&template, &output, &options, None)?;

    let mut store = ResultStore::new();
    store.record(&template, &output, result);
    present(&store, &args, &settings.report_dir)?;
    store.clear();
    Ok(())
}

/// Print and export the latest run held in `store`.
fn present(store: &ResultStore, args: &CompareArgs, report_dir: &str) -> Result<()> {
    let Some(run) = store.current() else {
        return Ok(());
    };

    for w in &run.result.warnings {
        eprintln!("{} {}", "Warning:".yellow().bold(), w.reason);
    }

    if args.json {
        let payload = serde_json::json!({
            "template": run.template.display().to_string(),
            "output": run.output.display().to_string(),
            "finished_at": run.finished_at.to_rfc3339(),
            "summary": &run.summary,
            "accuracy": run.summary.accuracy(),
            "result": &run.result,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_ledger(run, args.wrong_only);
        print_summary(run);
    }

    if !args.no_report {
        let path = args
            .report
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_report_path(report_dir));
        let bytes = render_report(&run.result, &run.summary)?;
        write_report(&bytes, &path)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "report written");
        if !args.json {
            println!("\nReport written to {}", path.display());
        }
    }
    Ok(())
}
