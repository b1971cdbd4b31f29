use std::error::Error;
use std::io::{stdin, stdout, BufRead, Write};
use std::path::PathBuf;

use itertools::Itertools;
use structopt::StructOpt;
use vegas_bin::{init_logging, load_config};
use vegas_core::{
    deck::DeckSeed, dice::Face, Action, Audience, Event, GameState, Outgoing, PlayerId, Round,
    State,
};

const PLAYERS: [PlayerId; 2] = [1, 2];

#[derive(StructOpt)]
struct Opt {
    #[structopt(long, default_value)]
    seed: DeckSeed,
    #[structopt(long, parse(from_os_str), help = "JSON file with the game rules")]
    config: Option<PathBuf>,
    #[structopt(long)]
    max_rounds: Option<Round>,
    #[structopt(long, help = "Name for the player in seat 1")]
    name1: Option<String>,
    #[structopt(long, help = "Name for the player in seat 2")]
    name2: Option<String>,
    #[structopt(
        long,
        help = "Silence game prompts (useful for tests with set input)"
    )]
    no_prompts: bool,
    #[structopt(
        long,
        help = "Silence post-game info dump (useful when not doing tests)"
    )]
    no_summary: bool,
    #[structopt(
        long,
        help = "Keep playing new matches until quit command is given"
    )]
    multi_match: bool,
}

#[derive(Debug, Copy, Clone)]
enum Command {
    Roll,
    Bet(Face),
    Info,
    Quit,
    Help,
}

fn print_help() {
    println!("Known commands are:");
    for (cmds, desc) in [
        ("(h)elp", "This output."),
        ("(i)nfo", "Get info on the current state of the table."),
        ("(q)uit", "Stop playing."),
        ("(r)oll", "Current player rolls all their remaining dice."),
        ("(b)et X", "Current player puts every die showing X on casino X."),
    ] {
        println!("  {:9}: {}", cmds, desc);
    }
    println!("A bare number is short for a bet on that face.");
}

fn try_parse_face(word: &str) -> Result<Face, Box<dyn Error>> {
    Ok(Face::try_from(word.parse::<u8>()?)?)
}

fn try_parse_command(stream: &mut dyn BufRead) -> Result<Command, Box<dyn Error>> {
    let mut s = String::new();
    let n = stream.read_line(&mut s)?;
    let words: Vec<&str> = s.split_whitespace().collect();
    if n == 0 {
        return Ok(Command::Quit);
    } else if s.starts_with('#') {
        return Err("Comment line".into());
    }
    let c = match words[..] {
        [] => return Err("Empty input".into()),
        ["roll" | "r"] => Command::Roll,
        ["bet" | "b", x] => Command::Bet(try_parse_face(x)?),
        ["bet" | "b"] => return Err("No face given to bet on".into()),
        ["info" | "i"] => Command::Info,
        ["quit" | "q"] => Command::Quit,
        ["help" | "h"] => Command::Help,
        [x] if x.chars().all(|c| c.is_ascii_digit()) => Command::Bet(try_parse_face(x)?),
        [_] => return Err("Unable to parse first word as a command".into()),
        _ => return Err("Wrong number of words".into()),
    };
    Ok(c)
}

fn prompt(q: &str, display_prompts: bool) -> Result<Command, Box<dyn Error>> {
    if display_prompts {
        println!("{}", q);
    }
    let c = loop {
        if display_prompts {
            print!("> ");
            stdout().flush()?;
        }
        match try_parse_command(&mut stdin().lock()) {
            Ok(c) => break c,
            Err(e) => println!("{}", e),
        }
    };
    Ok(c)
}

/// Show what happened. Everybody shares the one terminal, so private events show up too.
/// Rejections are always shown so scripted runs can see them.
fn report(out: &[Outgoing], display_prompts: bool) {
    for o in out {
        match (&o.event, o.to) {
            (Event::Rejected(e), _) => println!("{}", e),
            // the info command covers these
            (Event::PlayerList(_) | Event::TableSnapshot(_), _) => {}
            (event, Audience::Only(pid)) if display_prompts => println!("  (to p{}) {}", pid, event),
            (event, _) if display_prompts => println!("  {}", event),
            _ => {}
        }
    }
}

fn print_table_info(gs: &GameState, prefix: &str) {
    println!("{}Round {} ({})", prefix, gs.round(), gs.state());
    for (face, c) in gs.casinos().iter() {
        println!(
            "{}[{}] {:<24} {}{}",
            prefix,
            face,
            c.notes().iter().join("/"),
            c.dice_by_player()
                .iter()
                .map(|(pid, n)| format!("p{}:{}", pid, n))
                .join(" "),
            match c.neutral() {
                0 => String::new(),
                n => format!(" n:{}", n),
            }
        );
    }
    for p in gs.players.players_iter() {
        println!(
            "{}{} Seat {} {:<12} [{:>7}] dice {}+{}n",
            prefix,
            if gs.current_turn() == Some(p.id) { "*" } else { " " },
            p.seat,
            p.display_name(),
            p.money,
            p.dice_color_left,
            p.dice_neutral_left,
        );
    }
    println!("{}Notes left in deck: {}", prefix, gs.deck_len());
}

/// Play one match to the end.
///
/// On clean exit, returns true if the player gave the quit command, otherwise false.
fn single_match(gs: &mut GameState, display_prompts: bool) -> Result<bool, Box<dyn Error>> {
    let out = gs.apply(PLAYERS[0], Action::StartGame);
    report(&out, display_prompts);
    if let Some(seed) = gs.match_seed() {
        if display_prompts {
            println!("DeckSeed: {}", seed);
        }
    }
    loop {
        let pid = match (gs.state(), gs.current_turn()) {
            (State::InProgress(_), Some(pid)) => pid,
            _ => return Ok(false),
        };
        let player = gs
            .players
            .player_by_id(pid)
            .ok_or("Current player isn't seated")?;
        let q = match &player.pending_roll {
            None => format!(
                "{}'s turn, {} colored and {} neutral dice left. Roll?",
                player.display_name(),
                player.dice_color_left,
                player.dice_neutral_left
            ),
            Some(dice) => format!(
                "{} rolled {}. Which face?",
                player.display_name(),
                dice.iter().join(" ")
            ),
        };
        let out = match prompt(&q, display_prompts)? {
            Command::Info => {
                if display_prompts {
                    print_table_info(gs, "  ");
                }
                vec![]
            }
            Command::Quit => return Ok(true),
            Command::Help => {
                if display_prompts {
                    print_help();
                }
                vec![]
            }
            Command::Roll => gs.apply(pid, Action::RollDice),
            Command::Bet(face) => gs.apply(pid, Action::ChooseBetValue(face)),
        };
        report(&out, display_prompts);
        if display_prompts {
            println!();
        }
    }
}

fn print_test_info(gs: &GameState) {
    println!("state {}", gs.state());
    println!("round {}", gs.round());
    for p in gs.players.players_iter() {
        println!("player {} money {}", p.id, p.money);
    }
    for p in gs.players.players_iter() {
        println!(
            "player {} dice {} {}",
            p.id, p.dice_color_left, p.dice_neutral_left
        );
    }
    for (face, c) in gs.casinos().iter() {
        println!("casino {} notes {}", face, c.notes().iter().join(" "));
    }
    println!("deck {}", gs.deck_len());
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();
    init_logging("warn");
    let config = load_config(opt.config.as_deref(), opt.max_rounds)?;
    let mut gs = GameState::with_seed(config, opt.seed);
    for (pid, name) in PLAYERS.into_iter().zip([opt.name1, opt.name2]) {
        let mut out = gs.apply(pid, Action::Join);
        out.extend(gs.apply(
            pid,
            Action::RegisterProfile {
                name,
                avatar: None,
                color: None,
            },
        ));
        if let Some(Outgoing {
            event: Event::Rejected(e),
            ..
        }) = out.iter().find(|o| matches!(o.event, Event::Rejected(_)))
        {
            return Err(e.clone().into());
        }
    }
    if !opt.no_prompts {
        println!(
            "{} seated, {} rounds at most",
            gs.players.players_iter().map(|p| p.display_name()).join(" and "),
            config.max_rounds
        );
    }
    loop {
        let wants_quit = single_match(&mut gs, !opt.no_prompts)?;
        if wants_quit || !opt.multi_match {
            break;
        }
    }
    if !opt.no_summary {
        print_test_info(&gs);
    }
    Ok(())
}
