//! Sample test cases and issues for the demo scenarios.
//!
//! All data is hardcoded and fictional. It stands in for the document store
//! and the defect tracker.

use serde_json::json;

use testrun_contracts::{
    execution::{IssueId, StepDescriptor, TestCaseDefinition, TestCaseId, TestCycleId},
    issue::{IssueSummary, Severity},
};

/// A three-step login test case.
pub fn login_test_case() -> TestCaseDefinition {
    TestCaseDefinition {
        id: TestCaseId("tc-login-001".to_string()),
        title: "Log in with valid credentials".to_string(),
        steps: vec![
            step("Open the login page", "Login form is shown"),
            step("Enter a valid username and password", "Fields accept input"),
            step("Press 'Sign in'", "Dashboard is shown"),
        ],
        expected_result: json!({
            "type": "doc",
            "content": [{ "type": "paragraph", "text": "User lands on the dashboard." }]
        }),
    }
}

/// The regression cycle the demo executions belong to.
pub fn regression_cycle() -> TestCycleId {
    TestCycleId("cycle-2024-r3".to_string())
}

/// Issues already open in the tracker.
pub fn open_issues() -> Vec<IssueSummary> {
    vec![
        IssueSummary {
            id: IssueId::new("abc123"),
            title: "Sign in button does nothing on second click".to_string(),
            severity: Severity::High,
            custom_id: "ISS-101".to_string(),
        },
        IssueSummary {
            id: IssueId::new("def456"),
            title: "Password field rejects paste".to_string(),
            severity: Severity::Medium,
            custom_id: "ISS-102".to_string(),
        },
        IssueSummary {
            id: IssueId::new("ghi789"),
            title: "Dashboard loads slowly after login".to_string(),
            severity: Severity::Low,
            custom_id: "ISS-117".to_string(),
        },
    ]
}

fn step(description: &str, expected: &str) -> StepDescriptor {
    StepDescriptor {
        description: description.to_string(),
        expected: expected.to_string(),
    }
}
