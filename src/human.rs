//! Human player reading commands from the terminal.

use std::collections::VecDeque;

use tracing::warn;

use crate::console::{Command, HELP, Terminal, parse_command};
use crate::error::GameError;
use crate::game::GameState;
use crate::movegen::{ActionKind, Move};
use crate::player::Player;
use crate::save::save_to_path;

pub struct HumanPlayer {
    name: String,
    terminal: Terminal,
    /// Tokens typed after a move on the same line, used for the next request.
    queued: VecDeque<String>,
}

impl HumanPlayer {
    pub fn new(name: impl Into<String>, terminal: Terminal) -> Self {
        Self {
            name: name.into(),
            terminal,
            queued: VecDeque::new(),
        }
    }

    fn prompt(&self, view: &GameState) -> String {
        let side = view.side_to_move();
        let state = view.side(side);
        match view.next_action() {
            ActionKind::Capture => format!("{} ({side}) - choose a piece to capture:", self.name),
            ActionKind::Place => format!(
                "{} ({side}) - place a piece, {} in hand:",
                self.name,
                state.in_hand()
            ),
            ActionKind::Slide => format!("{} ({side}) - move a piece:", self.name),
            ActionKind::Fly => format!("{} ({side}) - fly a piece anywhere:", self.name),
        }
    }

    fn handle_save(&self, view: &GameState, path: Option<String>) {
        let Some(path) = path else {
            self.terminal.say("Usage: save <path>");
            return;
        };
        match save_to_path(view, &path) {
            Ok(()) => self.terminal.say(format!("Game saved to {path}.")),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "save failed");
                self.terminal.say(format!("Could not save the game: {err:#}"));
            }
        }
    }
}

/// Read a move token in the form the state expects next.
///
/// Placements and captures take one point (`A1`), slides and flights take two
/// (`A1A4`). Letters are case-insensitive.
pub fn parse_move(view: &GameState, token: &str) -> Option<Move> {
    if !token.is_ascii() {
        return None;
    }
    let topo = view.board().topology();
    match view.next_action() {
        ActionKind::Place if token.len() == 2 => topo.parse_point(token).map(Move::Place),
        ActionKind::Capture if token.len() == 2 => topo.parse_point(token).map(Move::Capture),
        kind @ (ActionKind::Slide | ActionKind::Fly) if token.len() == 4 => {
            let from = topo.parse_point(&token[..2])?;
            let to = topo.parse_point(&token[2..])?;
            Move::relocation(kind, from, to)
        }
        _ => None,
    }
}

impl Player for HumanPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_move(&mut self, view: &GameState, legal: &[Move]) -> Result<Move, GameError> {
        loop {
            if let Some(token) = self.queued.pop_front() {
                if let Some(mv) = parse_move(view, &token) {
                    return Ok(mv);
                }
                self.queued.clear();
                self.terminal.say(format!("Invalid command: {token}"));
                continue;
            }

            self.terminal.say(self.prompt(view));
            let line = match self.terminal.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    warn!(player = %self.name, "input closed");
                    return Err(GameError::InputClosed);
                }
                Err(err) => {
                    warn!(player = %self.name, %err, "failed to read input");
                    return Err(GameError::InputClosed);
                }
            };

            match parse_command(&line) {
                Command::Empty => {}
                Command::Help => {
                    let topo = view.board().topology();
                    let moves: Vec<String> = legal.iter().map(|mv| mv.notation(topo)).collect();
                    self.terminal.say(HELP);
                    self.terminal.say(format!("Legal moves: {}", moves.join(" ")));
                }
                Command::Quit => return Err(GameError::Quit),
                Command::Save(path) => self.handle_save(view, path),
                Command::Tokens(tokens) => self.queued.extend(tokens),
            }
        }
    }

    fn notify_rejected(&mut self, _error: &GameError) {
        self.queued.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Side;
    use crate::rules::Rules;

    fn output_text(output: &std::rc::Rc<std::cell::RefCell<Vec<u8>>>) -> String {
        String::from_utf8(output.borrow().clone()).unwrap()
    }

    #[test]
    fn test_parse_move_by_phase() {
        let state = GameState::new(Rules::default());
        let a1 = state.board().topology().parse_point("A1").unwrap();
        assert_eq!(parse_move(&state, "a1"), Some(Move::Place(a1)));
        assert_eq!(parse_move(&state, "A1"), Some(Move::Place(a1)));
        assert_eq!(parse_move(&state, "a"), None);
        assert_eq!(parse_move(&state, "a1a4"), None);
        assert_eq!(parse_move(&state, "a4"), Some(Move::Place(9)));
        assert_eq!(parse_move(&state, "d4"), None);
        assert_eq!(parse_move(&state, "é1"), None);
    }

    #[test]
    fn test_skips_invalid_then_reads_move() {
        let (terminal, output) = Terminal::scripted("invalid cmd\nhelp\na\na1\n");
        let mut human = HumanPlayer::new("alice", terminal);
        let state = GameState::new(Rules::default());
        let legal = state.legal_moves();
        let mv = human.produce_move(&state, &legal).unwrap();
        assert_eq!(mv, Move::Place(0));
        let text = output_text(&output);
        assert!(text.contains("Invalid command: invalid"));
        assert!(text.contains("Invalid command: a\n"));
        assert!(text.contains("Legal moves: A1 D1 G1"));
    }

    #[test]
    fn test_same_line_capture_is_queued() {
        let (terminal, _output) = Terminal::scripted("g1 b2\n");
        let mut human = HumanPlayer::new("alice", terminal);
        let mut state = GameState::new(Rules::default());
        for (side, name) in [
            (Side::White, "A1"),
            (Side::Black, "B2"),
            (Side::White, "D1"),
            (Side::Black, "D2"),
        ] {
            let p = state.board().topology().parse_point(name).unwrap();
            state.play(side, Move::Place(p)).unwrap();
        }
        let mv = human.produce_move(&state, &state.legal_moves()).unwrap();
        state.play(Side::White, mv).unwrap();
        assert_eq!(state.pending_captures(), 1);
        let mv = human.produce_move(&state, &state.legal_moves()).unwrap();
        assert_eq!(mv, Move::Capture(3));
    }

    #[test]
    fn test_quit_and_end_of_input() {
        let state = GameState::new(Rules::default());
        let (terminal, _) = Terminal::scripted("QuIt\n");
        let mut human = HumanPlayer::new("alice", terminal);
        assert_eq!(human.produce_move(&state, &[]), Err(GameError::Quit));

        let (terminal, _) = Terminal::scripted("");
        let mut human = HumanPlayer::new("bob", terminal);
        assert_eq!(human.produce_move(&state, &[]), Err(GameError::InputClosed));
    }
}
