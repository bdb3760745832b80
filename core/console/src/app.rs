//! The operator loop.
//!
//! Wires the readiness precheck, the live channel and the action client
//! around the pure core: channel events fold through the reducer, operator
//! commands issue one-shot requests, and a plain-text projection of the
//! current state is printed on demand. All visual concerns stay here, out
//! of the core.

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::info;

use jointscope_core::config::ConsoleConfig;
use jointscope_core::error::{ConsoleError, Result};
use jointscope_core::readiness::{evaluate_readiness, ReadinessOutcome, ReadinessRow};
use jointscope_core::reducer::{reduce, ConsoleState};
use jointscope_core::session::SessionContext;
use jointscope_core::timeline::build_timeline;
use jointscope_core::token_store::TokenStore;
use jointscope_core::trace::{build_trace, Branch, TracePanel};
use jointscope_core::views::{allen_rows, panel_state, parameter_rows, PanelState};
use jointscope_protocol::{AdvanceRequest, PushMessage};

use crate::actions::ActionClient;
use crate::channel::{run_channel, ChannelEvent};

const CHANNEL_BUFFER: usize = 64;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Advance(AdvanceRequest),
    Stop,
    Reset,
    State,
    Recheck,
    Help,
    Exit,
    Unknown(String),
}

pub struct App {
    session: SessionContext,
    state: ConsoleState,
    client: ActionClient,
    config: ConsoleConfig,
    store: Option<TokenStore>,
}

impl App {
    pub fn new(session: SessionContext, config: ConsoleConfig, store: Option<TokenStore>) -> Result<Self> {
        let client = ActionClient::new(config.clone())?;
        Ok(Self {
            session,
            state: ConsoleState::default(),
            client,
            config,
            store,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();

        if !self.precheck(&mut stdin).await? {
            self.teardown();
            return Ok(());
        }

        let (tx, mut rx) = mpsc::channel(CHANNEL_BUFFER);
        let ws_url = self.config.ws_url(self.session.token());
        tokio::spawn(run_channel(ws_url, tx));
        notice("Connected. Type 'help' for commands.");

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(ChannelEvent::Push(message)) => self.apply_push(message),
                    Some(ChannelEvent::Disconnected { reason }) => {
                        notice(&format!("Connection to the server lost ({}). Re-enter with a token.", reason));
                        self.teardown();
                        return Ok(());
                    }
                    None => {
                        self.teardown();
                        return Ok(());
                    }
                },
                line = stdin.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) | Err(_) => {
                            self.teardown();
                            return Ok(());
                        }
                    };
                    if self.dispatch(parse_command(&line)).await {
                        self.teardown();
                        return Ok(());
                    }
                }
            }
        }
    }

    /// One readiness fetch per entry; re-checks are operator-initiated and
    /// replace the whole outcome at once. Returns false when the operator
    /// chose to leave instead.
    async fn precheck(&mut self, stdin: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
        loop {
            match self.client.fetch_readiness(&self.session).await {
                Ok(report) => match evaluate_readiness(&report) {
                    ReadinessOutcome::Ready => return Ok(true),
                    ReadinessOutcome::NotReady { rows } => {
                        notice("Components are not ready for joint functioning:");
                        print_readiness_rows(&rows);
                    }
                },
                Err(err) => {
                    // Pessimistic: any fetch failure reads as not ready.
                    notice(&format!("Readiness check failed: {}", err));
                }
            }
            println!("Press Enter to re-check, or type 'exit' to leave.");
            match stdin.next_line().await {
                Ok(Some(line)) if parse_command(&line) == Command::Exit => return Ok(false),
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => return Ok(false),
            }
        }
    }

    fn apply_push(&mut self, message: PushMessage) {
        let label = match &message {
            PushMessage::Simulation(_) => "simulation subsystem",
            PushMessage::TemporalSolver(_) => "temporal solver",
            PushMessage::Solver(_) => "solver",
            PushMessage::Joint(_) => "joint component",
        };
        let was_active = self.state.inference_active;
        self.state = reduce(&self.state, &message);
        info!(initiator = label, "Applied push message");

        if was_active && !self.state.inference_active {
            notice("Joint functioning stopped.");
        }
    }

    /// Handles one operator command. Returns true when the loop should end.
    async fn dispatch(&mut self, command: Command) -> bool {
        match command {
            Command::Advance(request) => self.advance(request).await,
            Command::Stop => self.stop().await,
            Command::Reset => self.reset().await,
            Command::State => self.render_state(),
            Command::Recheck => {
                // The live view is already gated; state arrives via pushes.
                notice("Already connected; readiness is only checked on entry.");
            }
            Command::Help => print_help(),
            Command::Exit => return true,
            Command::Unknown(line) => {
                notice(&format!("Unknown command '{}'. Type 'help'.", line));
            }
        }
        false
    }

    async fn advance(&mut self, request: AdvanceRequest) {
        let handle = self.session.handle();
        match self.client.advance(&self.session, &request).await {
            Ok(()) if self.session.accepts(handle) => {
                self.state.mark_advance_accepted();
                notice(&format!(
                    "Inference advancing: {} tact(s), {} ms between tacts.",
                    request.iterate, request.wait
                ));
            }
            Ok(()) => {}
            Err(err) => notice(&format!("Advance failed: {}", err)),
        }
    }

    async fn stop(&mut self) {
        if !self.state.inference_active {
            notice("No inference in progress; use 'reset' to clear snapshots.");
            return;
        }
        if self.state.stopping {
            notice("Stop already requested; waiting for confirmation.");
            return;
        }
        self.state.mark_stop_requested();
        let handle = self.session.handle();
        match self.client.stop(&self.session).await {
            Ok(()) => notice("Stop accepted; waiting for the joint component to confirm."),
            Err(err) => {
                if self.session.accepts(handle) {
                    self.state.mark_stop_failed();
                }
                notice(&format!("Stop failed: {}", err));
            }
        }
    }

    async fn reset(&mut self) {
        if self.state.inference_active {
            notice(&format!("Reset refused: {}", ConsoleError::InferenceActive));
            return;
        }
        let handle = self.session.handle();
        match self.client.reset(&self.session).await {
            Ok(()) if self.session.accepts(handle) => match self.state.apply_reset() {
                Ok(()) => notice("Reset done; subsystem snapshots cleared."),
                Err(err) => notice(&format!("Reset refused: {}", err)),
            },
            Ok(()) => {}
            Err(err) => notice(&format!("Reset failed: {}", err)),
        }
    }

    fn render_state(&self) {
        let active = self.state.inference_active;
        println!(
            "inference: {}{}",
            if active { "in progress" } else { "idle" },
            if self.state.stopping { " (stopping)" } else { "" }
        );

        println!("-- simulation subsystem --");
        match panel_state(self.state.simulation.as_ref(), active) {
            PanelState::Waiting => println!("waiting for joint functioning to start"),
            PanelState::Loading => println!("loading..."),
            PanelState::Ready(snapshot) => {
                for row in parameter_rows(snapshot) {
                    println!("{} / {} = {}", row.resource, row.parameter, row.value);
                }
            }
        }

        println!("-- temporal solver --");
        match panel_state(self.state.temporal_solver.as_ref(), active) {
            PanelState::Waiting => println!("waiting for joint functioning to start"),
            PanelState::Loading => println!("loading..."),
            PanelState::Ready(snapshot) => {
                let tacts = snapshot
                    .timeline
                    .as_ref()
                    .map(|log| log.tacts.as_slice())
                    .unwrap_or_default();
                let view = build_timeline(tacts);
                for lane in &view.lanes {
                    let spans: Vec<String> = view
                        .events
                        .iter()
                        .filter(|event| event.lane_id == lane.lane_id)
                        .map(|event| match event.end_tact {
                            Some(end) => format!("[{}..{}]", event.start_tact, end),
                            None => format!("[{}]", event.start_tact),
                        })
                        .collect();
                    println!("{}: {}", lane.label, spans.join(" "));
                }
                for row in allen_rows(snapshot) {
                    let value = match row.value {
                        Some(true) => "yes",
                        Some(false) => "no",
                        None => "not signified",
                    };
                    println!("{} {} -> {}", row.rule, row.relation, value);
                }
            }
        }

        println!("-- solver --");
        match build_trace(self.state.solver.as_ref(), active) {
            TracePanel::Waiting => println!("waiting for joint functioning to start"),
            TracePanel::Loading => println!("loading..."),
            TracePanel::Ready { steps, final_wm } => {
                for step in &steps {
                    let branch = match step.branch() {
                        Branch::Then => "THEN",
                        Branch::Else => "ELSE",
                    };
                    println!(
                        "step {}: rule {} ({}), conflict [{}], previously fired [{}]",
                        step.number,
                        step.selected_rule(),
                        branch,
                        step.conflict_rules().join(", "),
                        step.previously_fired().join(", "),
                    );
                }
                if let Some(wm) = final_wm {
                    for (reference, entry) in wm {
                        match &entry.non_factor {
                            Some(nf) => println!(
                                "wm {} = {} (belief [{}; {}], accuracy {})",
                                reference, entry.content, nf.belief, nf.probability, nf.accuracy
                            ),
                            None => println!("wm {} = {}", reference, entry.content),
                        }
                    }
                }
            }
        }
    }

    fn teardown(&mut self) {
        self.session.destroy();
        if let Some(store) = &self.store {
            if let Err(err) = store.clear() {
                tracing::warn!(error = %err, "Failed to clear stored token");
            }
        }
    }
}

fn parse_command(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => Command::Unknown(String::new()),
        Some("advance") => {
            let defaults = AdvanceRequest::default();
            let iterate = parts
                .next()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.iterate);
            let wait = parts
                .next()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.wait);
            Command::Advance(AdvanceRequest { iterate, wait })
        }
        Some("stop") => Command::Stop,
        Some("reset") => Command::Reset,
        Some("state") => Command::State,
        Some("recheck") => Command::Recheck,
        Some("help") => Command::Help,
        Some("exit") | Some("quit") => Command::Exit,
        Some(other) => Command::Unknown(other.to_string()),
    }
}

fn notice(text: &str) {
    println!("[{}] {}", Local::now().format("%H:%M:%S"), text);
}

fn print_readiness_rows(rows: &[ReadinessRow]) {
    for row in rows {
        println!(
            "{}: registration {}, configuration {}",
            row.display_name,
            tri_state(row.registered, "registered", "not registered"),
            tri_state(row.configured, "applied", "not applied"),
        );
    }
}

fn tri_state(value: Option<bool>, yes: &'static str, no: &'static str) -> &'static str {
    match value {
        Some(true) => yes,
        Some(false) => no,
        None => "pending",
    }
}

fn print_help() {
    println!("commands:");
    println!("  advance [iterate] [wait]  run inference tacts (defaults: 1, 500 ms)");
    println!("  stop                      request cooperative termination");
    println!("  reset                     clear snapshots (only while idle)");
    println!("  state                     print the current subsystem panels");
    println!("  exit                      disconnect and forget the token");
}
