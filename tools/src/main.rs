//! sim-runner: headless driver for the eco simulation engine.
//!
//! Usage:
//!   sim-runner --config data/templates/eco_city.json --ticks 60 --db run.db
//!   sim-runner --db run.db --owner alice --load 3 --ticks 30 --save "After a month"
//!   sim-runner --db run.db --owner alice --list
//!   sim-runner --ipc-mode [--realtime]
//!
//! IPC mode reads one JSON request per line on stdin and writes one JSON
//! response per line on stdout. With --realtime the session also ticks on
//! its own at the clock's speed; requests are queued and applied between
//! ticks on the simulation thread.

use anyhow::Result;
use ecosim_core::{
    command::PlayerCommand,
    config::SimConfig,
    engine::SimEngine,
    event::{EventLogEntry, SimEvent},
    observer::EventRecorder,
    store::SimStore,
    types::{Day, SaveId},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Instant;

const DEFAULT_CONFIG: &str = "data/templates/eco_city.json";

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Command { command: PlayerCommand },
    Save { title: Option<String> },
    Load { save_id: SaveId },
    ListSaves,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    day:       Day,
    paused:    bool,
    speed:     ecosim_core::clock::SimSpeed,
    title:     String,
    resources: ecosim_core::ledger::ResourceMap,
    grid:      Vec<Vec<Option<String>>>,
    events:    Vec<UiEvent>,
}

#[derive(serde::Serialize)]
struct UiEvent {
    #[serde(flatten)]
    event:    SimEvent,
    severity: Option<ecosim_core::event::Severity>,
    message:  Option<String>,
}

/// One running session plus the plumbing around it.
struct Runner<'a> {
    engine:     SimEngine,
    store:      &'a SimStore,
    recorder:   Arc<Mutex<EventRecorder>>,
    session_id: String,
    owner:      String,
}

impl<'a> Runner<'a> {
    fn new(mut engine: SimEngine, store: &'a SimStore, owner: &str) -> Self {
        let recorder = Arc::new(Mutex::new(EventRecorder::new()));
        engine.register_observer(Box::new(Arc::clone(&recorder)));
        Self {
            engine,
            store,
            recorder,
            session_id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
        }
    }

    /// Move everything the engine emitted since the last drain into the
    /// event log. Returns the drained events.
    fn drain_events(&self) -> Result<Vec<SimEvent>> {
        let events = match self.recorder.lock() {
            Ok(mut recorder) => std::mem::take(&mut recorder.events),
            Err(_) => anyhow::bail!("event recorder poisoned"),
        };
        for event in &events {
            if matches!(event, SimEvent::TickCompleted { .. }) {
                continue;
            }
            self.store
                .append_event(&EventLogEntry::from_event(&self.session_id, event)?)?;
        }
        Ok(events)
    }

    fn load_save(&mut self, save_id: SaveId) -> Result<()> {
        let payload = self.store.load_simulation(save_id)?;
        self.engine.load(payload)?;
        Ok(())
    }

    fn save(&self, title: Option<&str>) -> Result<SaveId> {
        let payload = self.engine.save(title);
        Ok(self.store.save_simulation(&self.owner, &payload)?)
    }

    /// Handle one request. Returns None when the session should end.
    fn handle(&mut self, cmd: IpcCommand) -> Result<Option<serde_json::Value>> {
        let reply = match cmd {
            IpcCommand::Quit => return Ok(None),
            IpcCommand::Tick { count } => {
                self.engine.run_ticks(count);
                self.ui_state()?
            }
            IpcCommand::GetState => self.ui_state()?,
            IpcCommand::Command { command } => match self.engine.apply_command(&command) {
                Ok(()) => self.ui_state()?,
                Err(e) => {
                    log::debug!("Rejected {}: {e}", command.name());
                    serde_json::json!({ "error": e.to_string() })
                }
            },
            IpcCommand::Save { title } => match self.save(title.as_deref()) {
                Ok(save_id) => serde_json::json!({ "saved": save_id }),
                Err(e) => error_reply("save", e),
            },
            IpcCommand::Load { save_id } => match self.load_save(save_id) {
                Ok(()) => self.ui_state()?,
                Err(e) => error_reply("load", e),
            },
            IpcCommand::ListSaves => match self.store.list_saves(&self.owner) {
                Ok(saves) => serde_json::to_value(saves)?,
                Err(e) => error_reply("list_saves", e),
            },
        };
        Ok(Some(reply))
    }

    fn ui_state(&self) -> Result<serde_json::Value> {
        let events = self
            .drain_events()?
            .into_iter()
            .map(|event| UiEvent {
                severity: event.severity(),
                message: event.message(),
                event,
            })
            .collect();
        let state = self.engine.state();
        let grid = state
            .grid
            .rows()
            .map(|row| row.iter().map(|c| c.as_ref().map(|e| e.id.clone())).collect())
            .collect();
        let ui = UiState {
            day: state.day,
            paused: self.engine.clock.paused,
            speed: self.engine.clock.speed,
            title: self.engine.config().title.clone(),
            resources: state.resources.as_map().clone(),
            grid,
            events,
        };
        Ok(serde_json::to_value(ui)?)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 30u64);
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let realtime = has_flag(&args, "--realtime");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let owner = string_arg(&args, "--owner").unwrap_or("local");
    let config_path = string_arg(&args, "--config").unwrap_or(DEFAULT_CONFIG);

    let store = SimStore::open(db)?;
    store.migrate()?;

    if has_flag(&args, "--list") {
        for save in store.list_saves(owner)? {
            println!("#{:<4} day {:<5} {}  {}", save.id, save.day, save.saved_at, save.title);
        }
        return Ok(());
    }

    let config = SimConfig::load(config_path)?;
    let engine = SimEngine::build(config, seed)?;
    let mut runner = Runner::new(engine, &store, owner);

    if let Some(save_id) = load_arg(&args)? {
        runner.load_save(save_id)?;
    }

    if !ipc_mode {
        println!("Eco Simulation — sim-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  db:        {db}");
        println!("  session:   {}", runner.session_id);
        println!();
    }

    if ipc_mode && realtime {
        run_realtime_loop(&mut runner)?;
    } else if ipc_mode {
        run_ipc_loop(&mut runner)?;
    } else {
        runner.engine.run_ticks(ticks);
        let events = runner.drain_events()?;
        if let Some(title) = string_arg(&args, "--save") {
            let save_id = runner.save(Some(title))?;
            println!("Saved as #{save_id}");
        }
        print_summary(&runner, &events)?;
    }

    Ok(())
}

fn run_ipc_loop(runner: &mut Runner) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<IpcCommand>(&line) {
            Ok(cmd) => match runner.handle(cmd)? {
                Some(reply) => writeln!(stdout, "{reply}")?,
                None => break,
            },
            Err(e) => writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?,
        }
        stdout.flush()?;
    }
    Ok(())
}

/// Tick on the clock's schedule while applying queued requests between
/// ticks. stdin is read on its own thread; only this thread touches the
/// engine.
fn run_realtime_loop(runner: &mut Runner) -> Result<()> {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(|l| l.ok()) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut stdout = io::stdout();
    let mut next_tick = Instant::now() + runner.engine.clock.tick_interval();
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        match rx.recv_timeout(timeout) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let reply = match serde_json::from_str::<IpcCommand>(&line) {
                    Ok(cmd) => match runner.handle(cmd)? {
                        Some(reply) => reply,
                        None => break,
                    },
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };
                writeln!(stdout, "{reply}")?;
                stdout.flush()?;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if !runner.engine.clock.paused {
                    runner.engine.tick();
                    writeln!(stdout, "{}", runner.ui_state()?)?;
                    stdout.flush()?;
                }
                next_tick = Instant::now() + runner.engine.clock.tick_interval();
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

fn print_summary(runner: &Runner, events: &[SimEvent]) -> Result<()> {
    let state = runner.engine.state();
    let crises = events.iter().filter(|e| e.is_crisis()).count();
    let destroyed = runner
        .store
        .event_count(&runner.session_id, "building_destroyed")?;

    println!("=== RUN SUMMARY ===");
    println!("  title:          {}", runner.engine.config().title);
    println!("  final day:      {}", state.day);
    println!("  buildings:      {}", state.grid.occupied_count());
    println!("  crisis events:  {crises}");
    println!("  destroyed:      {destroyed}");

    println!();
    println!("=== RESOURCES ===");
    for (name, balance) in state.resources.iter() {
        println!("  {name:<14} {balance:>10.1}");
    }
    Ok(())
}

/// Reply for a request that failed without ending the session.
fn error_reply(request: &str, err: impl std::fmt::Display) -> serde_json::Value {
    log::warn!("{request} failed: {err}");
    serde_json::json!({ "error": err.to_string() })
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// `--load <id>`, rejecting ids that do not parse.
fn load_arg(args: &[String]) -> Result<Option<SaveId>> {
    string_arg(args, "--load")
        .map(|raw| {
            raw.parse::<SaveId>()
                .map_err(|e| anyhow::anyhow!("Invalid --load id '{raw}': {e}"))
        })
        .transpose()
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
