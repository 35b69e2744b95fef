pub mod reveal;
pub mod session;
pub mod state;

pub use reveal::RevealTimer;
pub use session::{QuizSession, SessionSettings, DEFAULT_REVEAL_DELAY};
pub use state::{Answer, AnswerError, AnswerOutcome, SessionState};
