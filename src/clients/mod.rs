pub mod grading_client;
pub mod scripted_client;

pub use grading_client::{GradingApi, HttpGradingClient};
pub use scripted_client::{RecordedRequest, ScriptedGradingApi, ScriptedReply};
