use std::collections::HashMap;
use std::error::Error;
use std::path::PathBuf;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use structopt::StructOpt;
use tracing::{info, warn};
use vegas_bin::{init_logging, load_config};
use vegas_core::{
    deck::DeckSeed, Action, Currency, Event, GameState, Outgoing, PlayerId, Round, State,
};

const PLAYERS: [PlayerId; 2] = [1, 2];

#[derive(StructOpt)]
struct Opt {
    #[structopt(long, default_value = "100")]
    games: u32,
    #[structopt(long, default_value, help = "Seed of the first match; later ones derive from it")]
    seed: DeckSeed,
    #[structopt(long, default_value = "0", help = "Seed for the players' choices")]
    choice_seed: u64,
    #[structopt(long, parse(from_os_str), help = "JSON file with the game rules")]
    config: Option<PathBuf>,
    #[structopt(long)]
    max_rounds: Option<Round>,
    #[structopt(long, help = "Don't print the per-match lines")]
    no_summary: bool,
}

#[derive(Debug, Default)]
struct Stats {
    matches: u32,
    wins: HashMap<PlayerId, u32>,
    no_winner: u32,
    rounds: u32,
    money: HashMap<PlayerId, Currency>,
    notes_to_neutral: u32,
    notes_unclaimed: usize,
    rejected: u32,
}

impl Stats {
    fn record(&mut self, out: &[Outgoing]) {
        for o in out {
            match &o.event {
                Event::RoundSetup { casinos, .. } => {
                    self.rounds += 1;
                    self.notes_unclaimed += casinos.iter().map(|c| c.notes.len()).sum::<usize>();
                }
                Event::Payouts(p) => {
                    self.notes_unclaimed = self.notes_unclaimed.saturating_sub(p.len());
                    self.notes_to_neutral += p.iter().filter(|p| p.player_id.is_none()).count() as u32;
                }
                Event::GameOver { players, winner } => {
                    self.matches += 1;
                    match winner {
                        Some((pid, _)) => *self.wins.entry(*pid).or_default() += 1,
                        None => self.no_winner += 1,
                    }
                    for p in players {
                        *self.money.entry(p.id).or_default() += p.money;
                    }
                }
                Event::Rejected(e) => {
                    warn!(error = %e, "simulated player made an illegal move");
                    self.rejected += 1;
                }
                _ => {}
            }
        }
    }

    fn print(&self) {
        let m = self.matches.max(1);
        println!("matches {}", self.matches);
        for pid in PLAYERS {
            println!(
                "player {} wins {} avg_money {}",
                pid,
                self.wins.get(&pid).copied().unwrap_or(0),
                self.money.get(&pid).copied().unwrap_or(0) / m as Currency
            );
        }
        println!("no_winner {}", self.no_winner);
        println!("avg_rounds {:.2}", f64::from(self.rounds) / f64::from(m));
        println!("notes_to_neutral {}", self.notes_to_neutral);
        println!("notes_unclaimed {}", self.notes_unclaimed);
        println!("rejected {}", self.rejected);
    }
}

/// Play a match with each player picking a random face from their roll
fn play_match(gs: &mut GameState, rng: &mut ChaChaRng) -> Result<Vec<Outgoing>, Box<dyn Error>> {
    let mut out = gs.apply(PLAYERS[0], Action::StartGame);
    while let (State::InProgress(_), Some(pid)) = (gs.state(), gs.current_turn()) {
        out.extend(gs.apply(pid, Action::RollDice));
        let faces: Vec<_> = gs
            .players
            .player_by_id(pid)
            .and_then(|p| p.pending_roll.as_ref())
            .ok_or("Roll didn't leave any dice to choose from")?
            .iter()
            .map(|d| d.face)
            .unique()
            .collect();
        let face = *faces.choose(rng).ok_or("Empty roll")?;
        out.extend(gs.apply(pid, Action::ChooseBetValue(face)));
    }
    Ok(out)
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();
    init_logging("info");
    let config = load_config(opt.config.as_deref(), opt.max_rounds)?;
    let mut gs = GameState::with_seed(config, opt.seed);
    for pid in PLAYERS {
        gs.apply(pid, Action::Join);
    }
    let mut rng = ChaChaRng::seed_from_u64(opt.choice_seed);
    let mut stats = Stats::default();
    for n in 0..opt.games {
        let out = play_match(&mut gs, &mut rng)?;
        stats.record(&out);
        if !opt.no_summary {
            let seed = gs.match_seed().map(|s| s.to_string()).unwrap_or_default();
            let money = gs
                .players
                .players_iter()
                .map(|p| format!("{}={}", p.id, p.money))
                .join(" ");
            println!("match {:>4} seed {} {}", n + 1, seed, money);
        }
    }
    info!(games = opt.games, "simulation done");
    stats.print();
    Ok(())
}
