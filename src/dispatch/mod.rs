//! Command dispatch loop
//!
//! Every member of the group runs the same loop: arrive at the round
//! barrier, learn the announced command, execute the matching handler on
//! locally-owned state. Only the coordinator reads input; that is the one
//! place behavior branches on role, resolved from the member's rank.
//!
//! # Round ordering
//!
//! The barrier-then-announce prefix of every round is load-bearing: it
//! guarantees all members observe the same command value before any member
//! branches on it, and that the scatter of a "bmi" round happens after that
//! round's announcement. Handlers then run without further synchronization.
//!
//! # Session state
//!
//! The generated-data guard is evaluated on every rank. Announcements are
//! totally ordered and observed by all members, so each rank can flip its
//! own `data_generated` flag when a generate round is announced and every
//! rank reaches the same guard verdict without an extra exchange. The
//! dataset itself lives only on the coordinator; workers first see records
//! when a shard arrives.

use crate::config::Config;
use crate::group::GroupMember;
use crate::output::json::{write_json_report, JsonRound, JsonSessionReport};
use crate::output::{self, ResultSink};
use crate::patient::{PatientGenerator, PatientRecord};
use crate::shard::{self, BmiOutcome};
use crate::stats;
use crate::Result;
use anyhow::Context;
use std::collections::VecDeque;
use std::sync::Arc;

/// Menu selections, announced verbatim to every member each round
///
/// Out-of-range choices are announced like any other so the group stays in
/// lockstep; the coordinator reports them after the announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// Replace the dataset with freshly generated records
    Generate,
    /// Scatter the dataset and compute per-record BMI on every rank
    ComputeBmi,
    /// Report the dataset-wide average heart rate
    Average,
    /// End the session
    Exit,
    /// A choice outside the menu range
    Invalid(i64),
}

impl MenuCommand {
    /// Map a raw menu choice to a command
    pub fn from_choice(choice: i64) -> Self {
        match choice {
            1 => MenuCommand::Generate,
            2 => MenuCommand::ComputeBmi,
            3 => MenuCommand::Average,
            4 => MenuCommand::Exit,
            other => MenuCommand::Invalid(other),
        }
    }

    /// Short name used in session reports
    pub fn label(&self) -> &'static str {
        match self {
            MenuCommand::Generate => "generate",
            MenuCommand::ComputeBmi => "bmi",
            MenuCommand::Average => "average",
            MenuCommand::Exit => "exit",
            MenuCommand::Invalid(_) => "invalid",
        }
    }
}

/// Dispatcher states
///
/// One transition is resolved per round from the announced command and the
/// session state; `AwaitingCommand` doubles as the "round rejected" target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    AwaitingCommand,
    Generating,
    ComputingBmi,
    ComputingAverage,
    Exiting,
}

/// Resolve the transition for an announced command
///
/// Pure; every rank evaluates it with the same inputs and reaches the same
/// state, which is what keeps guarded rounds collective-free on all ranks.
pub fn transition(command: MenuCommand, data_generated: bool) -> DispatchState {
    match command {
        MenuCommand::Generate => DispatchState::Generating,
        MenuCommand::ComputeBmi if data_generated => DispatchState::ComputingBmi,
        MenuCommand::Average if data_generated => DispatchState::ComputingAverage,
        MenuCommand::ComputeBmi | MenuCommand::Average => DispatchState::AwaitingCommand,
        MenuCommand::Exit => DispatchState::Exiting,
        MenuCommand::Invalid(_) => DispatchState::AwaitingCommand,
    }
}

/// Where the coordinator's menu selections come from
///
/// Stdin in production; a scripted sequence in tests, mirroring the
/// mock-engine pattern so the whole loop runs without a terminal.
pub trait CommandSource: Send {
    /// Read the next raw menu choice
    ///
    /// `None` means input is exhausted, which the dispatcher treats as an
    /// exit request so a closed stdin ends every rank cleanly.
    fn next_choice(&mut self) -> Result<Option<i64>>;
}

/// Blocking stdin source
pub struct StdinCommands;

impl CommandSource for StdinCommands {
    fn next_choice(&mut self) -> Result<Option<i64>> {
        let mut line = String::new();
        let read = std::io::stdin()
            .read_line(&mut line)
            .context("Failed to read menu choice")?;
        if read == 0 {
            return Ok(None);
        }
        // A line that does not parse maps to 0, outside the menu range, and
        // takes the invalid-choice path.
        Ok(Some(line.trim().parse::<i64>().unwrap_or(0)))
    }
}

/// Scripted source for tests and non-interactive runs
pub struct ScriptedCommands {
    choices: VecDeque<i64>,
}

impl ScriptedCommands {
    /// Create a source that replays `choices` in order, then reports EOF
    pub fn new(choices: &[i64]) -> Self {
        Self {
            choices: choices.iter().copied().collect(),
        }
    }
}

impl CommandSource for ScriptedCommands {
    fn next_choice(&mut self) -> Result<Option<i64>> {
        Ok(self.choices.pop_front())
    }
}

/// Per-member session state threaded through the loop
#[derive(Default)]
struct Session {
    /// The authoritative dataset; `Some` only on the coordinator
    dataset: Option<Vec<PatientRecord>>,
    /// Whether a generate round has been announced; tracked on every rank
    data_generated: bool,
    /// Round accounting for the session report; coordinator only
    rounds: Vec<JsonRound>,
}

/// Run one member's dispatch loop until an exit command is announced
///
/// `commands` must be `Some` on the coordinator and is ignored on workers.
/// Every member of a group must run this loop for the session to make
/// progress; a member that does not participate wedges the group (the
/// documented limitation of the synchronous design).
pub fn run_member(
    member: GroupMember,
    config: &Config,
    mut commands: Option<&mut dyn CommandSource>,
    sink: Arc<dyn ResultSink>,
) -> Result<()> {
    if member.is_coordinator() && commands.is_none() {
        anyhow::bail!("Coordinator requires a command source");
    }

    let mut generator = if member.is_coordinator() {
        Some(match config.generator.seed {
            Some(seed) => PatientGenerator::with_seed(seed),
            None => PatientGenerator::new(),
        })
    } else {
        None
    };

    let mut session = Session::default();

    loop {
        member.barrier();

        let choice = match commands.as_deref_mut() {
            Some(source) if member.is_coordinator() => {
                output::print_menu(sink.as_ref());
                match source.next_choice()? {
                    Some(raw) => Some(MenuCommand::from_choice(raw)),
                    None => Some(MenuCommand::Exit),
                }
            }
            _ => None,
        };

        let command = member.announce(choice)?;

        match transition(command, session.data_generated) {
            DispatchState::Generating => {
                if let Some(generator) = generator.as_mut() {
                    session.dataset = Some(generator.generate(config.generator.patients));
                    sink.result_line("Patient data generated.");
                    session.rounds.push(JsonRound {
                        command: command.label().to_string(),
                        accepted: true,
                        average_heart_rate: None,
                        shard_len: None,
                        dropped_records: None,
                    });
                }
                session.data_generated = true;
            }
            DispatchState::ComputingBmi => {
                let shard_len = shard::shard_len(config.generator.patients, member.size());
                let shard = member.scatter(session.dataset.as_deref(), shard_len)?;

                for outcome in shard::compute_shard_bmi(&shard, member.rank(), shard_len) {
                    match outcome {
                        BmiOutcome::Computed { patient, bmi } => sink.result_line(&format!(
                            "Process {}, Patient {}: BMI = {:.2}",
                            member.rank(),
                            patient,
                            bmi
                        )),
                        BmiOutcome::Invalid { local_index } => sink.error_line(&format!(
                            "Error: Invalid height or weight for patient {}",
                            local_index + 1
                        )),
                    }
                }

                if member.is_coordinator() {
                    session.rounds.push(JsonRound {
                        command: command.label().to_string(),
                        accepted: true,
                        average_heart_rate: None,
                        shard_len: Some(shard_len),
                        dropped_records: Some(shard::dropped_records(
                            config.generator.patients,
                            member.size(),
                        )),
                    });
                }
            }
            DispatchState::ComputingAverage => {
                if let Some(dataset) = session.dataset.as_deref() {
                    if let Some(average) = stats::average_heart_rate(dataset) {
                        sink.result_line(&format!("Average Heart Rate: {:.2} bpm", average));
                        session.rounds.push(JsonRound {
                            command: command.label().to_string(),
                            accepted: true,
                            average_heart_rate: Some(average),
                            shard_len: None,
                            dropped_records: None,
                        });
                    }
                }
            }
            DispatchState::AwaitingCommand => {
                if member.is_coordinator() {
                    match command {
                        MenuCommand::ComputeBmi | MenuCommand::Average => {
                            sink.result_line(
                                "Patient data not generated yet. Please select option 1 first.",
                            );
                        }
                        _ => sink.result_line("Invalid choice. Please try again."),
                    }
                    session.rounds.push(JsonRound {
                        command: command.label().to_string(),
                        accepted: false,
                        average_heart_rate: None,
                        shard_len: None,
                        dropped_records: None,
                    });
                }
            }
            DispatchState::Exiting => break,
        }
    }

    if member.is_coordinator() {
        if let Some(path) = &config.output.json_output {
            let mut report = JsonSessionReport::new(member.size(), config.generator.patients);
            report.rounds = session.rounds;
            write_json_report(path, &report)?;
            sink.result_line(&format!("Session report written to {}", path.display()));
        }
    }

    Ok(())
}
