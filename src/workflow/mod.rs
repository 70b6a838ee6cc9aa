pub mod batch_grading_session;
pub mod session_ctx;

pub use batch_grading_session::{
    BatchGradingSession, CloseOutcome, GradingTicket, SessionPhase, StartOutcome,
};
pub use session_ctx::SessionCtx;
