use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use ratatui::DefaultTerminal;

use royal_ur::games::ur::{BinaryDice, Dice, Event, GameEngine, Layout, Phase, ScriptedDice, Seat};

mod tui;

// Hard stop for simulated games that keep bouncing tokens back to start
const MAX_PLIES: usize = 20_000;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Simulate {
        #[arg(short)]
        log_file: PathBuf,
        #[arg(short, default_value_t = 100)]
        n_games: usize,
        #[command(flatten)]
        game: GameOptions,
    },
    Interactive {
        #[command(flatten)]
        game: GameOptions,
    },
    // Print a layout as JSON together with its board diagram
    Layout {
        #[command(flatten)]
        game: GameOptions,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    Classic,
    Compact,
}

#[derive(Clone, Debug, clap::Args)]
struct GameOptions {
    #[arg(long, value_enum, default_value_t = Variant::Classic)]
    variant: Variant,
    // JSON layout file, overrides --variant
    #[arg(long)]
    layout: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    // Fixed, repeating sequence of rolls instead of random dice
    #[arg(long, value_delimiter = ',')]
    rolls: Vec<u8>,
    #[arg(long, default_value = "Player One")]
    player_one: String,
    #[arg(long, default_value = "Player Two")]
    player_two: String,
}

type BoxedDice = Box<dyn Dice>;

impl GameOptions {
    fn layout(&self) -> Result<Layout> {
        match &self.layout {
            Some(path) => Layout::from_json_file(path),
            None => Ok(match self.variant {
                Variant::Classic => Layout::classic(),
                Variant::Compact => Layout::compact(),
            }),
        }
    }

    fn dice(&self, seed: Option<u64>) -> Result<BoxedDice> {
        if !self.rolls.is_empty() {
            return Ok(Box::new(ScriptedDice::new(self.rolls.clone())?));
        }

        Ok(match seed {
            Some(seed) => Box::new(BinaryDice::seeded(seed)),
            None => Box::new(BinaryDice::from_os_rng()),
        })
    }

    fn build_engine(&self, layout: Layout, seed: Option<u64>) -> Result<GameEngine<BoxedDice>> {
        let names = [self.player_one.clone(), self.player_two.clone()];
        GameEngine::new(layout, names, self.dice(seed)?)
    }
}

// One row in the simulation log
#[derive(Debug, Clone, serde::Serialize)]
struct PlayLogRow {
    game_id: usize,
    ply_id: usize,
    event: Event,
}

type PlayLog = Vec<PlayLogRow>;

struct GameRecord {
    winner: Option<Seat>,
    plies: usize,
    rows: PlayLog,
}

fn write_play_log(play_log: &[PlayLogRow], file: &PathBuf) -> Result<()> {
    let file = File::create(file).with_context(|| format!("Failed to create {}", file.display()))?;
    let mut writer = BufWriter::new(file);
    for item in play_log {
        jsonl::write(&mut writer, item)
            .map_err(|err| anyhow!("Failed to write play log: {:?}", err))?;
    }
    Ok(())
}

// Share of `total`, zero when nothing was played
fn ratio(count: usize, total: usize) -> f64 {
    count as f64 / total.max(1) as f64
}

fn report(records: &[GameRecord], names: &[String; 2]) {
    let total_games = records.len();

    for seat in Seat::ALL {
        let wins = records.iter().filter(|r| r.winner == Some(seat)).count();
        println!(
            "Win Count for {} ({}): {}/{}, ratio: {}",
            seat,
            names[seat.index()],
            wins,
            total_games,
            ratio(wins, total_games)
        );
    }

    let unfinished = records.iter().filter(|r| r.winner.is_none()).count();
    if unfinished > 0 {
        println!("Unfinished after {} plies: {}", MAX_PLIES, unfinished);
    }

    let plies: usize = records.iter().map(|r| r.plies).sum();
    println!("Average plies per game: {:.1}", ratio(plies, total_games));
}

// Play one game to the end, picking uniformly among the legal moves
fn play_one(options: &GameOptions, layout: Layout, game_id: usize) -> Result<GameRecord> {
    let seed = options.seed.map(|s| s.wrapping_add(game_id as u64));
    let mut engine = options.build_engine(layout, seed)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed.rotate_left(32)),
        None => StdRng::from_os_rng(),
    };

    let rows: Rc<RefCell<PlayLog>> = Rc::new(RefCell::new(Vec::new()));
    let ply = Rc::new(Cell::new(0usize));
    {
        let rows = rows.clone();
        let ply = ply.clone();
        engine.subscribe(move |event| {
            rows.borrow_mut().push(PlayLogRow { game_id, ply_id: ply.get(), event: event.clone() });
        });
    }

    engine.start_game()?;

    while ply.get() < MAX_PLIES {
        match engine.phase() {
            Phase::AwaitingRoll => {
                engine.player_roll()?;
            }
            Phase::AwaitingMoveChoice => {
                let moves = engine.legal_moves();
                match moves.choose(&mut rng) {
                    Some(token) => {
                        log::debug!("{}", engine);
                        engine.move_token(token)?;
                    }
                    None => {
                        engine.pass_turn()?;
                    }
                }
            }
            Phase::GameOver | Phase::NotStarted | Phase::AwaitingFirstPlayerSelection => break,
        }
        ply.set(ply.get() + 1);
    }

    if let Some(winner) = engine.winner() {
        log::info!("Game {}: winner is {} after {} plies", game_id, winner.name(), ply.get());
    } else {
        log::warn!("Game {} stopped after {} plies without a winner", game_id, ply.get());
    }

    let winner = engine.winner_seat();
    drop(engine);
    let rows = Rc::try_unwrap(rows)
        .map(RefCell::into_inner)
        .unwrap_or_else(|rows| rows.borrow().clone());

    Ok(GameRecord { winner, plies: ply.get(), rows })
}

fn simulate(options: &GameOptions, log_file: &PathBuf, n_games: usize) -> Result<()> {
    let layout = options.layout()?;

    log::info!("Running {} simulations on a board of {} cells", n_games, layout.size);

    let records: Vec<GameRecord> = (0..n_games)
        .into_par_iter()
        .map(|game_id| play_one(options, layout.clone(), game_id))
        .collect::<Result<Vec<_>>>()?;

    report(&records, &[options.player_one.clone(), options.player_two.clone()]);

    let play_log: PlayLog = records.into_iter().flat_map(|r| r.rows).collect();
    write_play_log(&play_log, log_file)
}

fn run_interactive(options: &GameOptions) -> Result<()> {
    color_eyre::install().map_err(|err| anyhow!("{}", err))?;

    let mut engine = options.build_engine(options.layout()?, options.seed)?;
    let messages: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    {
        let messages = messages.clone();
        engine.subscribe(move |event| messages.borrow_mut().push(event.to_string()));
    }
    engine.start_game()?;

    let mut terminal = ratatui::init();
    let result = interactive_loop(&mut terminal, &mut engine, &messages);
    ratatui::restore();
    result
}

fn interactive_loop(
    terminal: &mut DefaultTerminal,
    engine: &mut GameEngine<BoxedDice>,
    messages: &Rc<RefCell<Vec<String>>>,
) -> Result<()> {
    let mut status: Option<String> = None;

    loop {
        {
            let log = messages.borrow();
            let view = tui::GameView { engine, log: &log, status: status.as_deref() };
            terminal.draw(|frame| frame.render_widget(view, frame.area()))?;
        }

        let key_event = match event::read()? {
            TermEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => key_event,
            _ => continue,
        };

        let result = match key_event.code {
            KeyCode::Char('q') => break,
            KeyCode::Char('r') => engine.player_roll().map(|_| ()),
            KeyCode::Char('p') => engine.pass_turn().map(|_| ()),
            KeyCode::Char('n') => {
                messages.borrow_mut().clear();
                engine.start_game().map(|_| ())
            }
            KeyCode::Char(c) if c.is_ascii_digit() => match engine.active_player() {
                Some(player) => {
                    let token_id = format!("{}{}", player.seat().prefix(), c);
                    engine.move_token(&token_id).map(|_| ())
                }
                None => Ok(()),
            },
            _ => Ok(()),
        };

        status = result.err().map(|err| err.to_string());
    }

    Ok(())
}

fn show_layout(options: &GameOptions) -> Result<()> {
    let layout = options.layout()?;
    println!("{}", serde_json::to_string_pretty(&layout)?);

    // Fixed dice, no randomness needed for an empty board
    let names = [options.player_one.clone(), options.player_two.clone()];
    let engine = GameEngine::new(layout, names, ScriptedDice::new(vec![0, 1])?)?;
    print!("{}", engine);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.commands {
        Commands::Simulate { log_file, n_games, game } => simulate(&game, &log_file, n_games),
        Commands::Interactive { game } => run_interactive(&game),
        Commands::Layout { game } => show_layout(&game),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_without_games() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(3, 4), 0.75);
    }

    #[test]
    fn test_layout_command_and_tied_rolls() {
        let args = Args::parse_from(["royal-ur", "layout", "--variant", "compact"]);
        let Commands::Layout { game } = args.commands else {
            panic!("expected the layout command");
        };
        assert!(show_layout(&game).is_ok());

        let args = Args::parse_from(["royal-ur", "interactive", "--rolls", "1,1,3,3"]);
        let Commands::Interactive { game } = args.commands else {
            panic!("expected the interactive command");
        };
        assert!(game.build_engine(Layout::classic(), None).is_err());
    }
}
