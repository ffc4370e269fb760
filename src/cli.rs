//! Command-line front end.
//!
//! One-shot subcommands cover each registry operation; `console` (the
//! default) runs an interactive loop that feeds typed commands into a
//! [`PatientConsole`] as [`ConsoleEvent`]s.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{self, ConsoleConfig, FilterRetention};
use crate::console::{ConsoleError, PatientConsole, SubmitOutcome};
use crate::events::ConsoleEvent;
use crate::form::{
    FieldMark, FIELD_ADDRESS, FIELD_AGE, FIELD_APPOINTMENT_TIME, FIELD_DISEASE, FIELD_GENDER,
    FIELD_NAME, FIELD_PHONE, FIELD_SYMPTOMS,
};
use crate::models::{PatientFilter, PatientStatus, ServerReply};
use crate::notify::{Notifier, TerminalNotifier};
use crate::registry::{HttpRegistryClient, RegistryClient, RegistryError};
use crate::view::DoctorDropdown;

#[derive(Parser, Debug)]
#[command(name = "frontdesk")]
#[command(version)]
#[command(about = "Hospital front-desk patient console", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Base URL of the patient registry
    #[arg(long, global = true)]
    registry_url: Option<String>,

    /// Per-request timeout in seconds (at least 1)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Keep the active filters when the list reloads after a change
    #[arg(long, global = true)]
    keep_filters: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List patients, optionally filtered
    Patients {
        /// Case-insensitive id substring
        #[arg(long, default_value = "")]
        id: String,

        /// Case-insensitive phone substring
        #[arg(long, default_value = "")]
        phone: String,

        /// Exact doctor name
        #[arg(long)]
        doctor: Option<String>,

        /// Pending, Admitted or Discharged
        #[arg(long)]
        status: Option<PatientStatus>,
    },

    /// List the doctors currently assigned to patients
    Doctors,

    /// Register a new patient
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        disease: String,
        #[arg(long)]
        symptoms: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        phone: String,
        /// YYYY-MM-DDTHH:MM
        #[arg(long)]
        appointment_time: String,
    },

    /// Suggest doctors for a symptom description
    Suggest { symptoms: String },

    /// Change a patient's status
    Status {
        patient_id: String,
        status: PatientStatus,
    },

    /// Assign a bed to a patient
    AssignBed { patient_id: String },

    /// Remove a patient
    Delete { patient_id: String },

    /// Registry-wide counts by status and doctor
    Stats,

    /// Interactive console (default)
    Console,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Console(#[from] ConsoleError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exit code for a registry refusal or a form that failed validation.
const EXIT_REFUSED: u8 = 2;

pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cli = Cli::parse();
    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// CLI flags win over `FRONTDESK_*` variables, which win over defaults.
fn resolve_config(cli: &Cli, base: ConsoleConfig) -> ConsoleConfig {
    ConsoleConfig {
        registry_url: cli.registry_url.clone().unwrap_or(base.registry_url),
        timeout_secs: cli.timeout_secs.unwrap_or(base.timeout_secs),
        filter_retention: if cli.keep_filters {
            FilterRetention::Preserve
        } else {
            base.filter_retention
        },
    }
}

fn execute(cli: Cli) -> Result<ExitCode, CliError> {
    let config = resolve_config(&cli, ConsoleConfig::from_env());
    let registry = HttpRegistryClient::new(&config.registry_url, config.timeout_secs)?;
    tracing::info!(
        registry = registry.base_url(),
        timeout_secs = config.timeout_secs,
        "Registry configured"
    );

    let mut console = PatientConsole::new(registry, TerminalNotifier, config.filter_retention);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Command::Console) {
        Command::Patients {
            id,
            phone,
            doctor,
            status,
        } => {
            console.load_patients()?;
            if let Some(value) = &doctor {
                if let Err(message) = choose_doctor(&console.state().doctor_dropdown, value) {
                    writeln!(out, "{message}")?;
                    return Ok(ExitCode::from(EXIT_REFUSED));
                }
            }
            let table = console.set_filter(PatientFilter {
                id_query: id,
                phone_query: phone,
                doctor,
                status,
            });
            write!(out, "{table}")?;
        }
        Command::Doctors => {
            console.load_patients()?;
            for option in console.state().doctor_dropdown.options.iter().skip(1) {
                writeln!(out, "{}", option.label)?;
            }
        }
        Command::Add {
            name,
            age,
            gender,
            disease,
            symptoms,
            address,
            phone,
            appointment_time,
        } => {
            let form = console.form_mut();
            for (field, value) in [
                (FIELD_NAME, name),
                (FIELD_AGE, age),
                (FIELD_GENDER, gender),
                (FIELD_DISEASE, disease),
                (FIELD_SYMPTOMS, symptoms),
                (FIELD_ADDRESS, address),
                (FIELD_PHONE, phone),
                (FIELD_APPOINTMENT_TIME, appointment_time),
            ] {
                form.set(field, value).map_err(ConsoleError::from)?;
            }
            return Ok(match console.submit_appointment()? {
                SubmitOutcome::Accepted(_) => ExitCode::SUCCESS,
                SubmitOutcome::Invalid | SubmitOutcome::Refused { .. } => {
                    ExitCode::from(EXIT_REFUSED)
                }
            });
        }
        Command::Suggest { symptoms } => {
            for line in &console.suggest_doctors(&symptoms)?.items {
                writeln!(out, "{line}")?;
            }
        }
        Command::Status { patient_id, status } => {
            let reply = console.update_status(&patient_id, status)?;
            return Ok(reply_exit_code(&reply));
        }
        Command::AssignBed { patient_id } => {
            let reply = console.assign_bed(&patient_id)?;
            let code = reply_exit_code(&reply);
            if let Some(bed) = reply.ok() {
                writeln!(out, "{}", bed.bed_number)?;
            }
            return Ok(code);
        }
        Command::Delete { patient_id } => {
            let reply = console.delete_patient(&patient_id)?;
            return Ok(reply_exit_code(&reply));
        }
        Command::Stats => {
            let stats = console.statistics()?;
            writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
        }
        Command::Console => {
            let stdin = io::stdin();
            interactive(&mut console, stdin.lock(), &mut out)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn reply_exit_code<T>(reply: &ServerReply<T>) -> ExitCode {
    if reply.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_REFUSED)
    }
}

// ─── Interactive console ──────────────────────────────────────────────────────

const HELP: &str = "\
Commands:
  show                      print the patient table
  reload                    fetch the patient list again
  id <text>                 filter by id substring (empty clears)
  phone <text>              filter by phone substring (empty clears)
  doctor <name>|all         filter by doctor
  only <status>|all         filter by status
  clear                     clear all filters
  set <field> <value>       fill an intake form field
  symptoms <text>           fill symptoms and fetch doctor suggestions
  form                      print the intake form
  submit                    validate and submit the intake form
  status <id> <status>      change a patient's status
  bed <id>                  assign a bed
  delete <id>               remove a patient
  stats                     registry statistics
  help                      this text
  quit                      leave the console";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Event(ConsoleEvent),
    /// Doctor filter by dropdown value; empty means "All Doctors".
    Doctor(String),
    Show,
    Form,
    Stats,
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));

    let input = match command {
        "show" | "ls" => Input::Show,
        "form" => Input::Form,
        "stats" => Input::Stats,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "reload" => Input::Event(ConsoleEvent::ReloadRequested),
        "clear" => Input::Event(ConsoleEvent::FiltersCleared),
        "submit" => Input::Event(ConsoleEvent::SubmitRequested),
        "id" => Input::Event(ConsoleEvent::IdQueryChanged(rest.to_string())),
        "phone" => Input::Event(ConsoleEvent::PhoneQueryChanged(rest.to_string())),
        "doctor" => Input::Doctor(if rest == "all" { "" } else { rest }.to_string()),
        "only" => {
            let status = match rest {
                "" | "all" => None,
                s => Some(parse_status(s)?),
            };
            Input::Event(ConsoleEvent::StatusFilterSelected(status))
        }
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: set <field> <value>")?;
            Input::Event(ConsoleEvent::FieldEdited {
                field: field.to_string(),
                value: value.trim().to_string(),
            })
        }
        "symptoms" => Input::Event(ConsoleEvent::SymptomsEntered(rest.to_string())),
        "status" => {
            let (patient_id, status) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: status <id> <status>")?;
            Input::Event(ConsoleEvent::StatusChanged {
                patient_id: patient_id.to_string(),
                status: parse_status(status.trim())?,
            })
        }
        "bed" => Input::Event(ConsoleEvent::AssignBedRequested {
            patient_id: required_id(rest, "bed")?,
        }),
        "delete" => Input::Event(ConsoleEvent::DeleteRequested {
            patient_id: required_id(rest, "delete")?,
        }),
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(input)
}

fn parse_status(value: &str) -> Result<PatientStatus, String> {
    value.parse().map_err(|_| {
        let options: Vec<&str> = PatientStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("status must be one of {}", options.join(", "))
    })
}

/// Resolve a doctor through the dropdown so only listed names filter.
fn choose_doctor(dropdown: &DoctorDropdown, value: &str) -> Result<ConsoleEvent, String> {
    dropdown.choose(value).ok_or_else(|| {
        let mut options = vec!["all"];
        options.extend(dropdown.options.iter().skip(1).map(|o| o.label.as_str()));
        format!("doctor must be one of {}", options.join(", "))
    })
}

fn required_id(rest: &str, command: &str) -> Result<String, String> {
    if rest.is_empty() {
        return Err(format!("usage: {command} <id>"));
    }
    Ok(rest.to_string())
}

/// Run the console loop until `quit` or end of input.
fn interactive<C, N>(
    console: &mut PatientConsole<C, N>,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<(), CliError>
where
    C: RegistryClient,
    N: Notifier,
{
    // A registry that is down is reported by the console itself; keep going.
    if console.dispatch(ConsoleEvent::Ready).is_ok() {
        write!(out, "{}", console.table())?;
    }
    writeln!(out, "Type `help` for commands.")?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event = match parse_line(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Ok(Input::Show) => {
                write!(out, "{}", console.table())?;
                continue;
            }
            Ok(Input::Form) => {
                for field in console.state().form.fields() {
                    let mark = if field.mark == FieldMark::Invalid {
                        "  <- invalid"
                    } else {
                        ""
                    };
                    writeln!(out, "{:<18}{}{mark}", field.id, field.value)?;
                }
                continue;
            }
            Ok(Input::Stats) => {
                if let Ok(stats) = console.statistics() {
                    writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
                }
                continue;
            }
            Ok(Input::Event(event)) => event,
            Ok(Input::Doctor(value)) => {
                match choose_doctor(&console.state().doctor_dropdown, &value) {
                    Ok(event) => event,
                    Err(message) => {
                        writeln!(out, "{message}")?;
                        continue;
                    }
                }
            }
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };

        let redraw = event.is_filter_change()
            || event.is_mutation()
            || event == ConsoleEvent::ReloadRequested;
        let suggesting = matches!(event, ConsoleEvent::SymptomsEntered(_));

        match console.dispatch(event) {
            Ok(()) => {
                if redraw {
                    write!(out, "{}", console.table())?;
                }
                if suggesting {
                    for item in &console.state().suggestions.items {
                        writeln!(out, "  {item}")?;
                    }
                }
            }
            Err(ConsoleError::Form(e)) => writeln!(out, "{e}")?,
            Err(ConsoleError::Registry(e)) => {
                tracing::debug!(error = %e, "Console command failed");
            }
        }
    }
    Ok(())
}
