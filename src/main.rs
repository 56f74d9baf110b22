//! duel - command-line front end for the duel engine
//!
//! `parse` shows what the ability parser makes of a text, `audit` reports
//! catalog coverage, `demo` plays a greedy self-play duel and `run` replays a
//! JSON command script.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use duel_engine::config::RulesConfig;
use duel_engine::core::{CardId, PlayerId, TargetRef};
use duel_engine::game::{
    apply, ActivationOutcome, ActivationRequest, Command, CommandOutcome, GameLogger, GameState,
    OutputMode, Phase, VerbosityLevel,
};
use duel_engine::loader::{DeckList, DeckLoader, GameInitializer, JsonCatalog};
use duel_engine::parser;
use duel_engine::zones::{Stance, Zone};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.json");
const SAMPLE_DECK_1: &str = include_str!("../data/knights.deck");
const SAMPLE_DECK_2: &str = include_str!("../data/wardens.deck");

/// Verbosity level (accepts names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Rules engine for a turn-based trading-card duel", long_about = None)]
struct Cli {
    /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
    #[arg(long, short = 'v', default_value = "normal", global = true)]
    verbosity: VerbosityArg,

    /// Seed for shuffles and random discards
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Rules configuration (JSON)
    #[arg(long, value_name = "CONFIG_FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse ability text and print the effect descriptors
    Parse {
        /// Ability text, e.g. "Discard 1 card; draw 2 cards."
        text: String,
    },

    /// Report ability clauses the parser does not understand
    Audit {
        /// Card catalog (JSON array of definitions)
        catalog: PathBuf,
    },

    /// Play a greedy self-play duel
    Demo {
        /// Card catalog (defaults to the bundled sample)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Deck list for player 1
        #[arg(long, requires = "deck2")]
        deck1: Option<PathBuf>,

        /// Deck list for player 2
        #[arg(long, requires = "deck1")]
        deck2: Option<PathBuf>,

        /// Stop after this many turns
        #[arg(long, default_value_t = 6)]
        turns: u32,
    },

    /// Apply a JSON script of commands to a fresh duel
    Run {
        /// Command script: [{"player": 0, "command": "advance_phase"}, ...]
        script: PathBuf,

        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long, requires = "deck2")]
        deck1: Option<PathBuf>,

        #[arg(long, requires = "deck1")]
        deck2: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize)]
struct ScriptStep {
    /// Seat index, 0 or 1
    player: usize,
    #[serde(flatten)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RulesConfig::load(path)
            .with_context(|| format!("loading rules config {}", path.display()))?,
        None => RulesConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    let verbosity = cli.verbosity.0;

    match cli.command {
        Commands::Parse { text } => run_parse(&text)?,
        Commands::Audit { catalog } => run_audit(&catalog)?,
        Commands::Demo {
            catalog,
            deck1,
            deck2,
            turns,
        } => {
            let game = setup(config, catalog.as_deref(), deck1.as_deref(), deck2.as_deref(), verbosity)?;
            run_demo(game, turns, verbosity)?;
        }
        Commands::Run {
            script,
            catalog,
            deck1,
            deck2,
        } => {
            let game = setup(config, catalog.as_deref(), deck1.as_deref(), deck2.as_deref(), verbosity)?;
            run_script(game, &script, verbosity)?;
        }
    }

    Ok(())
}

fn run_parse(text: &str) -> anyhow::Result<()> {
    let ability = parser::parse_multi(text);
    println!("{}", serde_json::to_string_pretty(&ability.effects)?);
    for clause in &ability.unrecognized {
        println!("unrecognized: {clause}");
    }
    Ok(())
}

fn run_audit(path: &Path) -> anyhow::Result<()> {
    let catalog =
        JsonCatalog::load(path).with_context(|| format!("loading catalog {}", path.display()))?;
    let audit = catalog.audit();
    let mut incomplete = 0;
    for entry in &audit {
        if entry.unrecognized.is_empty() {
            continue;
        }
        incomplete += 1;
        println!("#{} {} ({} effect(s) parsed)", entry.id, entry.name, entry.parsed);
        for clause in &entry.unrecognized {
            println!("    unrecognized: {clause}");
        }
    }
    println!("{} card(s), {} with unrecognized text", audit.len(), incomplete);
    Ok(())
}

fn load_deck(path: Option<&Path>, fallback: &str) -> anyhow::Result<DeckList> {
    Ok(match path {
        Some(path) => DeckLoader::load_from_file(path)
            .with_context(|| format!("loading deck {}", path.display()))?,
        None => DeckLoader::parse(fallback)?,
    })
}

fn setup(
    config: RulesConfig,
    catalog: Option<&Path>,
    deck1: Option<&Path>,
    deck2: Option<&Path>,
    verbosity: VerbosityLevel,
) -> anyhow::Result<GameState> {
    let catalog = match catalog {
        Some(path) => JsonCatalog::load(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => JsonCatalog::from_json_str(SAMPLE_CATALOG)?,
    };
    let deck1 = load_deck(deck1, SAMPLE_DECK_1)?;
    let deck2 = load_deck(deck2, SAMPLE_DECK_2)?;

    let mut game = GameInitializer::new(&catalog, config).init_game("Alice", &deck1, "Bob", &deck2)?;
    game.logger = GameLogger::with_verbosity(verbosity);
    game.logger.set_output_mode(OutputMode::Stdout);
    // Opening draws are setup, not play
    game.events.drain();
    Ok(game)
}

/// Applies commands through snapshots, printing each transition's events
struct Driver {
    game: GameState,
    verbosity: VerbosityLevel,
}

impl Driver {
    fn step(&mut self, actor: PlayerId, command: Command) -> Option<CommandOutcome> {
        let name = command.name();
        match apply(&self.game, actor, command) {
            Ok(transition) => {
                if self.verbosity >= VerbosityLevel::Minimal {
                    for record in &transition.events {
                        println!(
                            "  [turn {} {}] {}",
                            record.turn,
                            record.phase,
                            record.event.kind_name()
                        );
                    }
                }
                self.game = transition.state;
                Some(transition.outcome)
            }
            Err(err) => {
                if self.verbosity >= VerbosityLevel::Verbose {
                    println!("  player {actor} {name} rejected: {err}");
                }
                None
            }
        }
    }

    /// Both players pass until the chain is empty, answering selections with the first choices
    fn settle_chain(&mut self) {
        let mut guard = 0;
        while !self.game.chain.is_empty() || self.game.pending_selection.is_some() {
            guard += 1;
            if guard > 64 {
                break;
            }
            if let Some(pending) = &self.game.pending_selection {
                let chooser = pending.chooser;
                let choices = pending
                    .request
                    .available
                    .iter()
                    .take(pending.request.min)
                    .copied()
                    .collect();
                self.step(chooser, Command::SubmitSelection { choices });
                continue;
            }
            let holder = self.game.turn.priority_player;
            if self.step(holder, Command::PassPriority).is_none() {
                break;
            }
        }
    }

    fn advance_to(&mut self, actor: PlayerId, phase: Phase) {
        while self.game.turn.current_phase != phase && !self.game.is_game_over() {
            if self.step(actor, Command::AdvancePhase).is_none() {
                break;
            }
            self.settle_chain();
        }
    }

    fn hand(&self, player: PlayerId) -> Vec<CardId> {
        self.game
            .zones(player)
            .map(|z| z.hand.cards.clone())
            .unwrap_or_default()
    }

    fn summon_best(&mut self, actor: PlayerId) {
        let mut monsters: Vec<_> = self
            .hand(actor)
            .into_iter()
            .filter_map(|id| self.game.cards.get(id).ok())
            .filter(|c| c.is_monster() && c.tributes_required() == 0)
            .map(|c| (c.attack, c.id))
            .collect();
        monsters.sort();
        if let Some(&(_, card)) = monsters.last() {
            self.step(
                actor,
                Command::NormalSummon {
                    card,
                    tributes: vec![],
                },
            );
            self.settle_chain();
        }
    }

    fn play_spells(&mut self, actor: PlayerId) {
        let opponent = self.game.opponent_of(actor);
        for card in self.hand(actor) {
            let Ok(def) = self.game.cards.get(card) else {
                continue;
            };
            if !def.is_spell() || def.effects.is_empty() {
                continue;
            }
            let needs_target = def.effects[0].needs_declared_targets();
            let mut requests = vec![ActivationRequest::default()];
            if needs_target {
                requests = self
                    .game
                    .cards_in_zone(opponent, Zone::Board)
                    .into_iter()
                    .chain(self.game.cards_in_zone(actor, Zone::Board))
                    .map(|t| ActivationRequest::with_targets([TargetRef::Card(t)]))
                    .collect();
            }
            for request in requests {
                let command = Command::Activate {
                    card,
                    effect_index: 0,
                    request: request.clone(),
                };
                match self.step(actor, command) {
                    Some(CommandOutcome::Activation(ActivationOutcome::CostSelection(check))) => {
                        let payment = check.choices.iter().take(check.min).copied().collect();
                        self.step(
                            actor,
                            Command::Activate {
                                card,
                                effect_index: 0,
                                request: request.with_payment(payment),
                            },
                        );
                    }
                    Some(_) => {}
                    None => continue,
                }
                self.settle_chain();
                break;
            }
        }
    }

    fn attack_with_everything(&mut self, actor: PlayerId) {
        let opponent = self.game.opponent_of(actor);
        let attackers: Vec<_> = self
            .game
            .zones(actor)
            .map(|z| {
                z.board
                    .iter()
                    .filter(|b| b.is_face_up() && b.stance == Stance::Offense && !b.has_acted)
                    .map(|b| b.card)
                    .collect()
            })
            .unwrap_or_default();

        for attacker in attackers {
            if self.game.is_game_over() {
                return;
            }
            let power = self.game.effective_attack(attacker).unwrap_or(0);
            let defenders = self.game.cards_in_zone(opponent, Zone::Board);
            let target = if defenders.is_empty() {
                None
            } else {
                let beatable = defenders.into_iter().find(|&d| {
                    let Some(slot) = self.game.board_card(d) else {
                        return false;
                    };
                    let value = match slot.stance {
                        Stance::Offense => self.game.effective_attack(d),
                        Stance::Defense => self.game.effective_defense(d),
                    };
                    slot.is_face_up() && value.is_ok_and(|v| v < power)
                });
                match beatable {
                    Some(d) => Some(d),
                    None => continue,
                }
            };
            if self
                .step(actor, Command::DeclareAttack { attacker, target })
                .is_none()
            {
                continue;
            }
            self.settle_chain();
            self.step(actor, Command::ResolveBattle);
            self.settle_chain();
        }
    }
}

fn run_demo(game: GameState, turns: u32, verbosity: VerbosityLevel) -> anyhow::Result<()> {
    let mut driver = Driver { game, verbosity };

    while driver.game.turn.turn_number <= turns && !driver.game.is_game_over() {
        let actor = driver.game.turn.active_player;
        println!("== Turn {} ({})", driver.game.turn.turn_number, driver.game.player(actor)?.name);

        driver.advance_to(actor, Phase::Main1);
        driver.summon_best(actor);
        driver.play_spells(actor);
        if driver.step(actor, Command::AdvancePhase).is_some() {
            driver.settle_chain();
            driver.attack_with_everything(actor);
        }
        driver.advance_to(actor, Phase::End);
        if driver.step(actor, Command::PassTurn).is_none() {
            bail!("turn {} could not be passed", driver.game.turn.turn_number);
        }
        driver.settle_chain();
    }

    print_summary(&driver.game)
}

fn run_script(game: GameState, path: &Path, verbosity: VerbosityLevel) -> anyhow::Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
    let steps: Vec<ScriptStep> = serde_json::from_str(&content).context("parsing command script")?;
    let mut driver = Driver { game, verbosity };

    for (i, step) in steps.into_iter().enumerate() {
        let actor = driver
            .game
            .players
            .get(step.player)
            .map(|p| p.id)
            .with_context(|| format!("step {}: no player {}", i + 1, step.player))?;
        let name = step.command.name();
        let transition = apply(&driver.game, actor, step.command)
            .with_context(|| format!("step {} ({name})", i + 1))?;
        for record in &transition.events {
            println!("{}", serde_json::to_string(record)?);
        }
        driver.game = transition.state;
    }

    print_summary(&driver.game)
}

fn print_summary(game: &GameState) -> anyhow::Result<()> {
    println!("== After turn {}", game.turn.turn_number);
    for player in &game.players {
        let zones = game.zones(player.id)?;
        println!(
            "{}: {} LP, hand {}, deck {}, board {}",
            player.name,
            player.life,
            zones.hand.len(),
            zones.deck.len(),
            zones.board.len()
        );
    }
    if let Some(winner) = game.get_winner() {
        println!("Winner: {}", game.player(winner)?.name);
    }
    Ok(())
}
