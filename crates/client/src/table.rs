//! Shared in-memory table and the console loop driving it.

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracker_core::ItemId;
use tracker_runtime::host::{Notifier, Severity};
use tracker_runtime::{
    CommandReport, MemoryRoom, MemoryRoster, MemorySelection, RosterItem, Session, SessionHandle,
};

use crate::command::{Command, HELP};
use crate::config::DemoConfig;
use crate::render;

/// Prints notifications tagged with the player they belong to.
struct ConsoleNotifier {
    seat: usize,
}

impl Notifier for ConsoleNotifier {
    fn show(&self, message: &str, severity: Severity) {
        println!("[player {}] {severity}: {message}", self.seat + 1);
    }
}

struct Player {
    session: Session,
    handle: SessionHandle,
    selection: MemorySelection,
}

/// Every player's session on one room and one scene.
pub struct Table {
    roster: MemoryRoster,
    players: Vec<Player>,
    active: usize,
}

enum Flow {
    Continue,
    Quit,
}

impl Table {
    pub async fn open(config: &DemoConfig) -> Result<Self> {
        let room = MemoryRoom::new();
        let roster = MemoryRoster::new();
        let mut players = Vec::with_capacity(config.players);

        for seat in 0..config.players {
            let selection = MemorySelection::new(roster.clone());
            let session = Session::builder()
                .config(config.seat(seat))
                .store(room.clone())
                .roster(roster.clone())
                .selection(selection.clone())
                .notifier(ConsoleNotifier { seat })
                .build()
                .await
                .with_context(|| format!("failed to seat player {}", seat + 1))?;

            players.push(Player {
                handle: session.handle(),
                session,
                selection,
            });
        }

        tracing::info!(players = players.len(), "table ready");
        Ok(Self {
            roster,
            players,
            active: 0,
        })
    }

    /// Reads commands from stdin until `quit` or end of input, then shuts
    /// every session down.
    pub async fn run(mut self) -> Result<()> {
        println!("{} players at the table. Type `help` for commands.", self.players.len());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout
                .write_all(format!("player {}> ", self.active + 1).as_bytes())
                .await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };

            match self.execute(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => {
                    tracing::warn!(error = %err, "command failed");
                    println!("error: {err:#}");
                }
            }
        }

        self.close().await
    }

    async fn execute(&mut self, command: Command) -> Result<Flow> {
        let player = &self.players[self.active];
        let handle = &player.handle;

        let report = match command {
            Command::Spawn { id, name } => {
                self.roster.spawn(RosterItem::character(id, name))?;
                return Ok(Flow::Continue);
            }
            Command::Delete { id } => {
                if !self.roster.delete(&ItemId::new(id.as_str()))? {
                    println!("no token `{id}` on the scene");
                }
                return Ok(Flow::Continue);
            }
            Command::Select { ids } => {
                player.selection.select(ids.into_iter().map(ItemId::new))?;
                return Ok(Flow::Continue);
            }
            Command::Menu { ids } => {
                let menu = player
                    .selection
                    .menus()?
                    .into_iter()
                    .next()
                    .context("no context menu registered")?;
                let ids: Vec<ItemId> = ids.into_iter().map(ItemId::new).collect();
                let clicked = player.selection.click(&menu.id, &ids)?;
                println!("{}: {clicked} token(s)", menu.label);
                return Ok(Flow::Continue);
            }
            Command::Seat { seat } => {
                if seat >= self.players.len() {
                    bail!("there are only {} players", self.players.len());
                }
                self.active = seat;
                return self.show().await;
            }
            Command::Show => return self.show().await,
            Command::Help => {
                println!("{HELP}");
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Add => handle.add_selected().await?,
            Command::Invoke => handle.invoke_selected().await?,
            Command::Next => handle.next_turn().await?,
            Command::Previous => handle.previous_turn().await?,
            Command::Reset => handle.reset_turns().await?,
            Command::Up { index } => handle.move_up(index).await?,
            Command::Down { index } => handle.move_down(index).await?,
            Command::Remove { index } => handle.remove(index).await?,
        };

        self.print_report(&report);
        self.show().await
    }

    fn print_report(&self, report: &CommandReport) {
        if let Some(line) = render::report(report) {
            println!("{line}");
        }
    }

    async fn show(&self) -> Result<Flow> {
        let snapshot = self.players[self.active].handle.snapshot().await?;
        println!("{}", render::turn_order(&snapshot));
        Ok(Flow::Continue)
    }

    async fn close(self) -> Result<()> {
        for player in self.players {
            player.session.shutdown().await?;
        }
        tracing::info!("table closed");
        Ok(())
    }
}
