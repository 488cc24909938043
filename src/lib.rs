pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;

// Re-export the main error types for convenience
pub use error::{SentiboardError, SentiboardResult};

// Re-export dispatcher and workflow types
pub use api::{DispatchError, FileHandle, RequestDispatcher, SentimentSummary, WorkflowKind};

// Re-export dashboard types
pub use dashboard::{
    run_prediction, run_workflow, ChartSlot, ChartSlotManager, ChartSubtype, DashboardController,
    SharedController,
};

pub use config::{AppConfig, ConfigManager};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Test that the main modules are accessible
        assert!(std::any::type_name::<RequestDispatcher>().contains("RequestDispatcher"));
        assert!(std::any::type_name::<ChartSlotManager>().contains("ChartSlotManager"));
    }

    #[test]
    fn test_error_types_re_exported() {
        let err: SentiboardError = DispatchError::UserInput("Please upload a CSV file".into()).into();
        assert_eq!(err.to_string(), "Please upload a CSV file");

        let _result: SentiboardResult<()> = Ok(());
    }

    #[test]
    fn test_workflow_endpoints_available() {
        assert_eq!(WorkflowKind::BulkAnalyze.endpoint(), "/upload-feedback");
        assert_eq!(WorkflowKind::Train.endpoint(), "/train-model");
        assert_eq!(WorkflowKind::Test.endpoint(), "/test-model");
    }
}
