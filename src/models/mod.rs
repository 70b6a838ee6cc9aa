pub mod context;
pub mod grading;
pub mod loaders;
pub mod role;

pub use context::SessionContext;
pub use grading::{
    AverageScores, BatchGradeRequest, BatchGradeResponse, BatchGradingResult, GradingStatus,
    GradingSummary, ReturnFlags, StudentId,
};
pub use loaders::{load_correction_plan, CorrectionPlan};
pub use role::{Capability, Role};
