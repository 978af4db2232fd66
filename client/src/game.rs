use shared::{RoundResult, ServerFrame};

/// What the player has seen from the server so far
///
/// The server never tells a client which nickname a `WIN`/`LOSE` belongs
/// to, so the tallies count every outcome frame this connection received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientGameState {
    pub nickname: String,
    pub rounds_seen: u64,
    pub wins: u64,
    pub losses: u64,
    pub total_won: f64,
    pub last_result: Option<RoundResult>,
    pub last_error: Option<String>,
}

impl ClientGameState {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Self::default()
        }
    }

    pub fn apply_frame(&mut self, frame: &ServerFrame) {
        match frame {
            ServerFrame::Error(message) => self.last_error = Some(message.clone()),
            ServerFrame::Win(winnings) => {
                self.wins += 1;
                self.total_won += winnings;
            }
            ServerFrame::Lose => self.losses += 1,
            ServerFrame::Winners(result) => {
                self.rounds_seen += 1;
                self.last_result = Some(result.clone());
            }
        }
    }

    /// One-line status shown after each round summary
    pub fn status_line(&self) -> String {
        format!(
            "[{}] rounds: {}, wins: {}, losses: {}, total won: {:.2}",
            self.nickname, self.rounds_seen, self.wins, self.losses, self.total_won
        )
    }
}
