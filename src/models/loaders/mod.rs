pub mod plan_loader;

pub use plan_loader::{load_correction_plan, CorrectionPlan};
