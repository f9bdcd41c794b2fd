//! Release workflow driven by the command line

pub mod orchestration;

pub use orchestration::{
    execute_release, plan_release, render_documents, run_release, ReleaseDocuments, ReleasePlan,
    ReleaseRun, ReleaseWorkflowArgs, WorkflowResult,
};
