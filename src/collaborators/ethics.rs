//! Ethical governor interface and a keyword-rule implementation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utilities::errors::BridgeError;

/// Outcome tag of an ethical review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    ApproveWithConditions,
    Deny,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::ApproveWithConditions => "approve_with_conditions",
            Self::Deny => "deny",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tag of an ethical review. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`EthicalGovernor::review_decision`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthicalDecision {
    pub decision: Decision,
    pub reasoning: String,
    pub severity: Severity,
}

/// Reviews a proposed action.
pub trait EthicalGovernor: Send + Sync + fmt::Debug {
    fn review_decision(
        &self,
        action_type: &str,
        context: &Value,
        metadata: &Value,
    ) -> Result<EthicalDecision, BridgeError>;
}

// ---------------------------------------------------------------------------
// KeywordGovernor
// ---------------------------------------------------------------------------

/// Flags messages containing configured keywords.
///
/// The most severe matching rule decides: `High` and `Critical` deny,
/// `Medium` approves with conditions, no match approves.
#[derive(Debug, Clone)]
pub struct KeywordGovernor {
    rules: Vec<(String, Severity)>,
}

impl Default for KeywordGovernor {
    fn default() -> Self {
        Self::empty()
            .with_rule("weapon", Severity::Critical)
            .with_rule("malware", Severity::High)
            .with_rule("exploit", Severity::High)
            .with_rule("steal", Severity::High)
            .with_rule("password", Severity::Medium)
            .with_rule("bypass", Severity::Medium)
            .with_rule("personal data", Severity::Medium)
    }
}

impl KeywordGovernor {
    /// A governor with no rules; approves everything.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a keyword rule (matched case-insensitively).
    pub fn with_rule(mut self, keyword: impl Into<String>, severity: Severity) -> Self {
        self.rules.push((keyword.into().to_lowercase(), severity));
        self
    }
}

impl EthicalGovernor for KeywordGovernor {
    fn review_decision(
        &self,
        action_type: &str,
        context: &Value,
        _metadata: &Value,
    ) -> Result<EthicalDecision, BridgeError> {
        let message = context
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("")
            .to_lowercase();

        let worst = self
            .rules
            .iter()
            .filter(|(keyword, _)| message.contains(keyword.as_str()))
            .max_by_key(|(_, severity)| *severity);

        let review = match worst {
            None => EthicalDecision {
                decision: Decision::Approve,
                reasoning: format!("No ethical concerns detected for {}", action_type),
                severity: Severity::Low,
            },
            Some((keyword, severity)) => {
                let decision = if *severity >= Severity::High {
                    Decision::Deny
                } else {
                    Decision::ApproveWithConditions
                };
                EthicalDecision {
                    decision,
                    reasoning: format!(
                        "{} references '{}' ({} severity)",
                        action_type, keyword, severity
                    ),
                    severity: *severity,
                }
            }
        };

        tracing::debug!(
            action_type,
            decision = %review.decision,
            severity = %review.severity,
            "ethical review"
        );
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review(message: &str) -> EthicalDecision {
        KeywordGovernor::default()
            .review_decision(
                "user_request",
                &json!({"message": message, "persona": "user"}),
                &json!({}),
            )
            .unwrap()
    }

    #[test]
    fn test_benign_message_is_approved() {
        let decision = review("Help me design a calm color palette");
        assert_eq!(decision.decision, Decision::Approve);
        assert_eq!(decision.severity, Severity::Low);
        assert!(decision.reasoning.contains("user_request"));
    }

    #[test]
    fn test_medium_keyword_is_conditional() {
        let decision = review("How do I reset my PASSWORD?");
        assert_eq!(decision.decision, Decision::ApproveWithConditions);
        assert_eq!(decision.severity, Severity::Medium);
    }

    #[test]
    fn test_most_severe_rule_wins() {
        let decision = review("bypass the scanner and deploy malware");
        assert_eq!(decision.decision, Decision::Deny);
        assert_eq!(decision.severity, Severity::High);
        assert!(decision.reasoning.contains("malware"));
    }

    #[test]
    fn test_missing_message_is_approved() {
        let decision = KeywordGovernor::default()
            .review_decision("user_request", &json!({}), &Value::Null)
            .unwrap();
        assert_eq!(decision.decision, Decision::Approve);
    }

    #[test]
    fn test_tags_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(Decision::ApproveWithConditions).unwrap(),
            json!("approve_with_conditions")
        );
        assert_eq!(serde_json::to_value(Severity::Critical).unwrap(), json!("critical"));
        assert_eq!(Decision::Deny.to_string(), "deny");
    }
}
