use todo::error::Error;
use todo::output::{error_kind, error_next_steps, format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("todo bulk-delete: deleted 2 of 3 tasks");
    human.push_summary("server", "http://localhost:8000");
    human.push_detail("deleted 1, 3");
    human.push_warning("task 2: Server error (500): delete failed");
    human.push_next_step("todo list");

    let rendered = format_human(&human);
    assert!(rendered.contains("todo bulk-delete: deleted 2 of 3 tasks"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- server: http://localhost:8000"));
    assert!(rendered.contains("Details:"));
    assert!(rendered.contains("- deleted 1, 3"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("- task 2: Server error (500): delete failed"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- todo list"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("No tasks found.");
    let rendered = format_human(&human);
    assert_eq!(rendered, "No tasks found.");
}

#[test]
fn rate_limit_has_its_own_kind() {
    let err = Error::RateLimited {
        detail: "Too many requests.".to_string(),
        retry_after_secs: Some(5),
    };
    assert_eq!(error_kind(&err), "rate_limited");
    assert!(!error_next_steps(&err).is_empty());

    let err = Error::Validation("task title is required".to_string());
    assert_eq!(error_kind(&err), "user_error");

    let err = Error::OperationFailed("boom".to_string());
    assert_eq!(error_kind(&err), "operation_failed");
}
