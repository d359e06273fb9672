//! Command line front end for `expense_core_cli`.

use std::{
    env,
    io::{self, Read},
};

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use spendwise_domain::{total_amount, Frequency, RecurringPattern};

use crate::{
    errors::{AppError, Result},
    output,
    session::{StartupReport, StartupSession},
    utils::build_info,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate { as_of: Option<NaiveDate> },
    Preview,
    List,
    Add,
    Expenses,
    Version,
    Help,
}

/// Pattern fields accepted by `add`; id and checkpoint are always assigned here.
#[derive(Debug, Deserialize)]
pub struct PatternRequest {
    pub amount: f64,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub note: Option<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub month_of_year: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "RecurringPattern::default_active")]
    pub is_active: bool,
}

impl PatternRequest {
    pub fn into_pattern(self) -> RecurringPattern {
        let mut pattern = RecurringPattern::new(
            self.amount,
            self.category_id.unwrap_or_else(Uuid::nil),
            self.frequency,
            self.start_date,
        );
        pattern.note = self.note;
        pattern.day_of_week = self.day_of_week;
        pattern.day_of_month = self.day_of_month;
        pattern.month_of_year = self.month_of_year;
        pattern.end_date = self.end_date;
        pattern.is_active = self.is_active;
        pattern
    }
}

pub fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };

    let parsed = match command.as_str() {
        "generate" => {
            let as_of = args.next().map(|raw| parse_date(&raw)).transpose()?;
            Command::Generate { as_of }
        }
        "preview" => Command::Preview,
        "list" => Command::List,
        "add" => Command::Add,
        "expenses" => Command::Expenses,
        "version" | "--version" | "-V" => Command::Version,
        "help" | "--help" | "-h" => Command::Help,
        other => {
            return Err(AppError::InvalidInput(format!("unknown command `{}`", other)));
        }
    };

    if let Some(extra) = args.next() {
        return Err(AppError::InvalidInput(format!(
            "unexpected argument `{}`",
            extra
        )));
    }
    Ok(parsed)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!("`{}` is not a date (expected YYYY-MM-DD)", raw))
    })
}

pub fn run_cli() -> Result<()> {
    let command = match parse_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            print_usage();
            return Err(err);
        }
    };

    match command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Version => {
            println!("{}", build_info::current().summary());
            Ok(())
        }
        command => {
            let mut session = StartupSession::open()?;
            execute(command, &mut session)
        }
    }
}

pub fn execute(command: Command, session: &mut StartupSession) -> Result<()> {
    match command {
        Command::Generate { as_of } => {
            let report = session.run_startup_pass(as_of)?;
            print_report(&report);
        }
        Command::Preview => print_preview(session),
        Command::List => print_patterns(session),
        Command::Add => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            let request: PatternRequest = serde_json::from_str(&buffer)?;
            let id = session.add_pattern(request.into_pattern())?;
            output::success(format!("Added recurring pattern {}", id));
        }
        Command::Expenses => print_expenses(session),
        Command::Version => println!("{}", build_info::current().summary()),
        Command::Help => print_usage(),
    }
    Ok(())
}

fn print_report(report: &StartupReport) {
    let result = &report.result;
    if let Some(backup) = &report.backup {
        output::info(format!("Backup saved as {}", backup.id));
    }
    output::success(format!(
        "Generated {} recurring expense(s) as of {}",
        result.generated, result.as_of
    ));
    for pattern_id in &result.deferred {
        output::warning(format!(
            "Pattern {} still has a backlog; run generate again to continue",
            pattern_id
        ));
    }
    if let Some(summary) = report.failure_summary() {
        output::warning(summary);
        for failure in &result.errors {
            output::warning(format!("  {}: {}", failure.pattern_id, failure.message));
        }
    }
}

fn print_preview(session: &StartupSession) {
    let rows = session.snapshot();
    if rows.is_empty() {
        output::info("No recurring patterns.");
        return;
    }
    println!(
        "{:<36}  {:<8}  {:>10}  {:<9}  {}",
        "PATTERN", "EVERY", "AMOUNT", "STATE", "NEXT DUE"
    );
    for row in rows {
        let next_due = row
            .next_due
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<36}  {:<8}  {:>10.2}  {:<9}  {}",
            row.pattern_id,
            row.frequency_label,
            row.amount,
            row.state.label(),
            next_due
        );
    }
}

fn print_patterns(session: &StartupSession) {
    let patterns = session.store().patterns();
    if patterns.is_empty() {
        output::info("No recurring patterns.");
        return;
    }
    for pattern in patterns {
        let checkpoint = pattern
            .last_generated_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "never".into());
        println!(
            "{}  {:<8} {:>10.2}  start {}  generated through {}{}{}",
            pattern.id,
            pattern.frequency.label(),
            pattern.amount,
            pattern.start_date,
            checkpoint,
            if pattern.is_active { "" } else { "  (paused)" },
            pattern
                .note
                .as_deref()
                .map(|note| format!("  {}", note))
                .unwrap_or_default()
        );
    }
}

fn print_expenses(session: &StartupSession) {
    let expenses = session.expenses();
    if expenses.is_empty() {
        output::info("No expenses.");
        return;
    }
    for expense in &expenses {
        let origin = match expense.recurring_pattern_id {
            Some(id) if expense.is_generated() => format!("recurring {}", id),
            _ => "manual".to_string(),
        };
        println!(
            "{}  {:>10.2}  {}  {}",
            expense.date,
            expense.amount,
            expense.note.as_deref().unwrap_or("-"),
            origin
        );
    }
    println!("{} expense(s), total {:.2}", expenses.len(), total_amount(&expenses));
}

pub fn print_usage() {
    eprintln!(
        "Usage: expense_core_cli <command>\n\
         Commands:\n  \
         generate [YYYY-MM-DD]   materialize due recurring expenses\n  \
         preview                 show the next due date of every pattern\n  \
         list                    list recurring patterns\n  \
         add < pattern.json      add a recurring pattern\n  \
         expenses                list expenses, newest first\n  \
         version                 print build information"
    );
}
