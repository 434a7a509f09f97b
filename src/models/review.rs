//! Review results returned by the LLM.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured review reply.
///
/// Field names match the JSON contract given to the model
/// (`{"prTitle": ..., "prDetails": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewReport {
    /// Short pull-request style title summarising the change.
    #[serde(rename = "prTitle")]
    pub pr_title: String,
    /// Markdown review body.
    #[serde(rename = "prDetails")]
    pub pr_details: String,
}

/// A parsed LLM review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    /// Free-form reply used verbatim.
    Raw(String),
    /// Title plus markdown body.
    Structured(ReviewReport),
}

impl Review {
    /// Review title, when the reply carried one.
    pub fn title(&self) -> Option<&str> {
        match self {
            Review::Raw(_) => None,
            Review::Structured(report) => Some(report.pr_title.as_str()),
        }
    }

    /// Markdown document persisted to disk and sent to notifiers.
    pub fn to_markdown(&self) -> String {
        match self {
            Review::Raw(text) => text.clone(),
            Review::Structured(report) => {
                format!("# {}\n\n{}\n", report.pr_title.trim(), report.pr_details.trim())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_uses_camel_case_keys() {
        let report: ReviewReport =
            serde_json::from_str(r#"{"prTitle":"Fix bug","prDetails":"Looks good"}"#).unwrap();
        assert_eq!(report.pr_title, "Fix bug");
        assert_eq!(report.pr_details, "Looks good");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["prTitle"], "Fix bug");
    }

    #[test]
    fn structured_markdown_has_title_heading() {
        let review = Review::Structured(ReviewReport {
            pr_title: "Fix bug".into(),
            pr_details: "- Issue 1: none\n".into(),
        });
        assert_eq!(review.title(), Some("Fix bug"));
        assert_eq!(review.to_markdown(), "# Fix bug\n\n- Issue 1: none\n");
    }

    #[test]
    fn raw_review_is_verbatim() {
        let review = Review::Raw("**File:** a.rs".into());
        assert_eq!(review.title(), None);
        assert_eq!(review.to_markdown(), "**File:** a.rs");
    }
}
