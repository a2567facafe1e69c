use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::{debug, warn, LevelFilter};
use regex::Regex;
use rustyline::config::Configurer;
use rustyline::Editor;
use thiserror::Error;

use crate::move_generator::MoveGenerator;
use crate::notation::{self, NotationError};
use crate::position::{FenError, Position};
use crate::search::{Engine, EngineConfig};
use crate::transposition_table::TranspositionEntry;
use crate::zob_hash::ZobristHasher;

const DEPTH_OPTION: &str = "Depth";
const HASH_OPTION: &str = "Hash";

#[derive(Debug, Error)]
pub enum UciError {
    #[error("missing argument: {0}")]
    MissingArg(&'static str),
    #[error("unknown or badly formed command: {0}")]
    UnknownCommand(String),
    #[error("bad or illegal move: {0}")]
    BadMove(#[source] NotationError),
    #[error("not a number: {0}")]
    BadValue(String),
    #[error(transparent)]
    Fen(#[from] FenError),
}

/// What the loop should do once a command has been handled
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(Vec<String>),
    Quit,
}

/// Integer option advertised as a UCI `spin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinOption {
    pub value: i64,
    pub default: i64,
    pub min: i64,
    pub max: i64,
}
impl SpinOption {
    fn new(default: i64, min: i64, max: i64) -> Self {
        SpinOption { value: default, default, min, max }
    }

    fn set_value(&mut self, v: i64) {
        self.value = v.clamp(self.min, self.max);
    }
}
impl Display for SpinOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "type spin default {} min {} max {}", self.default, self.min, self.max)
    }
}

/// Transposition table entries fitting in the given number of MiB
fn entries_for_mib(mib: i64) -> usize {
    let slot = std::mem::size_of::<Option<TranspositionEntry>>().max(1);
    (mib.max(1) as usize * 1024 * 1024) / slot
}

/// Line based front end speaking the UCI protocol, plus a few commands
/// meant for humans (`show`, `eval`, `perft`).
pub struct Uci {
    hasher: Arc<ZobristHasher>,
    generator: Arc<MoveGenerator>,
    position: Position,
    engine: Engine,
    options: BTreeMap<&'static str, SpinOption>,
    args_regex: Regex,
    quiet_level: LevelFilter,
}

impl Uci {
    pub fn new() -> Result<Uci, regex::Error> {
        let hasher = Arc::new(ZobristHasher::default());
        let generator = Arc::new(MoveGenerator::new());
        let defaults = EngineConfig::default();
        let default_mib = (defaults.transposition_capacity
            * std::mem::size_of::<Option<TranspositionEntry>>()
            / (1024 * 1024))
            .max(1) as i64;
        let options = BTreeMap::from([
            (DEPTH_OPTION, SpinOption::new(defaults.total_depth as i64, 1, 16)),
            (HASH_OPTION, SpinOption::new(default_mib, 1, 1024)),
        ]);
        Ok(Uci {
            position: Position::new(Arc::clone(&hasher), Arc::clone(&generator)),
            hasher,
            generator,
            engine: Engine::new(defaults),
            options,
            args_regex: Regex::new(r#"(".*?"|[^"\s]+)"#)?,
            quiet_level: log::max_level(),
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Reads commands until `quit` or end of input
    pub fn run(&mut self) {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);
        while let Ok(line) = editor.readline("") {
            match self.handle_command(&line) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue(replies)) => {
                    for reply in replies {
                        debug!("> {}", reply);
                        println!("{}", reply);
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
    }

    pub fn handle_command(&mut self, line: &str) -> Result<Flow, UciError> {
        let args: Vec<&str> = self.args_regex.find_iter(line).map(|m| m.as_str()).collect();
        let Some((&cmd, args)) = args.split_first() else {
            return Ok(Flow::Continue(vec![]));
        };
        debug!("< {}", line.trim());
        let replies = match cmd {
            "uci" => {
                let mut replies = vec![
                    format!("id name Stratagem {}", env!("CARGO_PKG_VERSION")),
                    "id author the Stratagem developers".to_string(),
                ];
                for (name, option) in &self.options {
                    replies.push(format!("option name {} {}", name, option));
                }
                replies.push("uciok".to_string());
                replies
            }
            "debug" => {
                let level = match args.first() {
                    Some(&"off") => self.quiet_level,
                    _ => LevelFilter::Debug,
                };
                log::set_max_level(level);
                vec![]
            }
            "isready" => vec!["readyok".to_string()],
            "setoption" => {
                self.set_option(args)?;
                vec![]
            }
            "ucinewgame" => {
                self.engine.clear();
                self.position = self.start_position();
                vec![]
            }
            "position" => {
                self.set_position(args)?;
                vec![]
            }
            "go" => self.go(args)?,
            "stop" | "ponderhit" => vec![],
            "quit" => return Ok(Flow::Quit),
            // Commands that are not part of the UCI protocol
            "show" => vec![self.position.to_string()],
            "eval" => vec![format!(
                "eval {} cp for {}",
                self.engine.evaluate(&self.position),
                self.position.side_to_move()
            )],
            "perft" => {
                let depth = args.first().ok_or(UciError::MissingArg("<depth>"))?;
                let depth = depth
                    .parse::<u32>()
                    .map_err(|_| UciError::BadValue(depth.to_string()))?;
                self.divide(depth)
            }
            _ => return Err(UciError::UnknownCommand(line.trim().to_string())),
        };
        Ok(Flow::Continue(replies))
    }

    fn start_position(&self) -> Position {
        Position::new(Arc::clone(&self.hasher), Arc::clone(&self.generator))
    }

    /// `setoption name <name> value <n>`
    fn set_option(&mut self, args: &[&str]) -> Result<(), UciError> {
        let name = match args {
            ["name", name, ..] => *name,
            _ => return Err(UciError::MissingArg("name <option>")),
        };
        let value = match args.get(2..) {
            Some(["value", value, ..]) => *value,
            _ => return Err(UciError::MissingArg("value <n>")),
        };
        let value = value
            .parse::<i64>()
            .map_err(|_| UciError::BadValue(value.to_string()))?;
        let Some(option) = self
            .options
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, o)| o)
        else {
            warn!("ignoring unknown option {}", name);
            return Ok(());
        };
        option.set_value(value);
        let value = option.value;

        if name.eq_ignore_ascii_case(DEPTH_OPTION) {
            self.engine.set_total_depth(value as u8);
        } else {
            let mut config = *self.engine.config();
            config.set_transposition_capacity(entries_for_mib(value));
            self.engine = Engine::new(config);
        }
        Ok(())
    }

    /// `position startpos|fen <fen> [moves <m1> ... <mn>]`
    ///
    /// The current position is only replaced once every move has been applied.
    fn set_position(&mut self, args: &[&str]) -> Result<(), UciError> {
        let moves_at = args.iter().position(|a| *a == "moves").unwrap_or(args.len());
        let (setup, moves) = args.split_at(moves_at);
        let mut position = match setup {
            ["startpos", ..] => self.start_position(),
            ["fen", fen @ ..] if !fen.is_empty() => {
                let fen = fen.join(" ").replace('"', "");
                Position::from_fen_with(&fen, Arc::clone(&self.hasher), Arc::clone(&self.generator))?
            }
            [] | ["fen"] => return Err(UciError::MissingArg("<startpos | fen>")),
            // a bare quoted FEN, as the regex keeps it in one piece
            [fen, ..] => Position::from_fen_with(
                &fen.replace('"', ""),
                Arc::clone(&self.hasher),
                Arc::clone(&self.generator),
            )?,
        };
        for mv in moves.iter().skip(1) {
            let mv = notation::from_long_algebraic(&position, mv).map_err(UciError::BadMove)?;
            position.apply(mv);
        }
        self.position = position;
        Ok(())
    }

    /// `go [depth <n>]`, other search limits are ignored
    fn go(&mut self, args: &[&str]) -> Result<Vec<String>, UciError> {
        let saved_depth = self.engine.config().total_depth;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match *arg {
                "depth" => {
                    let depth = iter.next().ok_or(UciError::MissingArg("depth <n>"))?;
                    let depth = depth
                        .parse::<u8>()
                        .map_err(|_| UciError::BadValue(depth.to_string()))?;
                    self.engine.set_total_depth(depth);
                }
                other => warn!("ignoring go argument {}", other),
            }
        }

        let replies = match self.engine.search(&self.position) {
            Some(report) => vec![report.to_string(), format!("bestmove {}", report.best_move)],
            None => vec!["bestmove 0000".to_string()],
        };
        self.engine.set_total_depth(saved_depth);
        Ok(replies)
    }

    /// Perft split by root move
    fn divide(&self, depth: u32) -> Vec<String> {
        let mut replies = vec![];
        let mut work = self.position.clone();
        let mut total = 0;
        if depth > 0 {
            for mv in &self.position.legal_moves() {
                work.apply(*mv);
                let count = crate::perft_count(&mut work, depth - 1);
                work.undo();
                total += count;
                replies.push(format!("{}: {}", mv, count));
            }
        } else {
            total = 1;
        }
        replies.push(format!("Nodes searched: {}", total));
        replies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replies(uci: &mut Uci, line: &str) -> Vec<String> {
        match uci.handle_command(line).unwrap() {
            Flow::Continue(r) => r,
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn handshake() {
        let mut uci = Uci::new().unwrap();
        let r = replies(&mut uci, "uci");
        assert!(r[0].starts_with("id name Stratagem"));
        assert!(r.contains(&"option name Depth type spin default 6 min 1 max 16".to_string()));
        assert_eq!(r.last().map(String::as_str), Some("uciok"));
        assert_eq!(replies(&mut uci, "isready"), vec!["readyok"]);
        assert!(replies(&mut uci, "   ").is_empty());
        assert_eq!(uci.handle_command("quit").unwrap(), Flow::Quit);
    }

    #[test]
    fn position_with_moves() {
        let mut uci = Uci::new().unwrap();
        replies(&mut uci, "position startpos moves e2e4 e7e5 g1f3");
        assert_eq!(
            uci.position().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
        replies(&mut uci, "position fen 4k3/1P6/8/8/8/8/8/4K3 w - - 0 1 moves b7b8n");
        assert_eq!(uci.position().to_fen(), "1N2k3/8/8/8/8/8/8/4K3 b - - 0 1");
        replies(&mut uci, r#"position "4k3/8/8/8/8/8/8/4K3 b - - 3 9""#);
        assert_eq!(uci.position().full_move_counter(), 9);
    }

    #[test]
    fn bad_input_keeps_the_position() {
        let mut uci = Uci::new().unwrap();
        replies(&mut uci, "position startpos moves e2e4");
        let before = uci.position().to_fen();
        assert!(matches!(
            uci.handle_command("position startpos moves e2e4 e2e4"),
            Err(UciError::BadMove(_))
        ));
        assert!(matches!(
            uci.handle_command("position fen 8/8/8 w - -"),
            Err(UciError::Fen(_))
        ));
        assert!(matches!(uci.handle_command("position"), Err(UciError::MissingArg(_))));
        assert!(matches!(uci.handle_command("jump"), Err(UciError::UnknownCommand(_))));
        assert_eq!(uci.position().to_fen(), before);
    }

    #[test]
    fn go_answers_with_a_legal_move() {
        let mut uci = Uci::new().unwrap();
        replies(&mut uci, "setoption name Hash value 1");
        replies(&mut uci, "position startpos moves f2f3 e7e5 g2g4");
        let r = replies(&mut uci, "go depth 2 wtime 1000");
        assert_eq!(r.len(), 2);
        assert!(r[0].starts_with("info depth 2 "));
        assert_eq!(r[1], "bestmove d8h4");
        // the one-off depth does not stick
        assert_eq!(uci.engine().config().total_depth, 6);
    }

    #[test]
    fn go_without_legal_moves() {
        let mut uci = Uci::new().unwrap();
        replies(&mut uci, "position startpos moves f2f3 e7e5 g2g4 d8h4");
        assert_eq!(replies(&mut uci, "go depth 1"), vec!["bestmove 0000"]);
    }

    #[test]
    fn options_are_clamped() {
        let mut uci = Uci::new().unwrap();
        replies(&mut uci, "setoption name Depth value 40");
        assert_eq!(uci.engine().config().total_depth, 16);
        replies(&mut uci, "setoption name depth value 3");
        assert_eq!(uci.engine().config().total_depth, 3);
        replies(&mut uci, "setoption name Hash value 1");
        assert_eq!(uci.engine().transposition_table().capacity(), entries_for_mib(1));
        assert_eq!(uci.engine().config().total_depth, 3);
        assert!(matches!(
            uci.handle_command("setoption name Depth value deep"),
            Err(UciError::BadValue(_))
        ));
    }

    #[test]
    fn tooling_commands() {
        let mut uci = Uci::new().unwrap();
        let r = replies(&mut uci, "perft 2");
        assert_eq!(r.len(), 21);
        assert_eq!(r.last().map(String::as_str), Some("Nodes searched: 400"));
        assert!(r.contains(&"e2e4: 20".to_string()));
        assert!(replies(&mut uci, "show")[0].contains("legal moves (20)"));
        assert!(replies(&mut uci, "eval")[0].ends_with("cp for w"));
    }
}
