//! Anthropic messages API models

use crate::config::ServiceConfig;
use crate::domain::Item;
use serde::{Deserialize, Serialize};

/// Built-in instruction sent as the system prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a medical coding expert. You will receive a list of HCPCS/CPT codes with their abbreviated CMS descriptions. Your job is to expand each description into a clear, readable name.

Rules:
- Expand ALL abbreviations (e.g., "mgmt" → "Management", "tx" → "Treatment", "mntr" → "Monitoring", "eval" → "Evaluation", "dx" → "Diagnosis", "hx" → "History", "inj" → "Injection", "surg" → "Surgery", "proc" → "Procedure", "addl" → "Additional", "ea" → "Each", "w/" → "with", "w/o" → "without", "1st" → "First", "subq" → "Subcutaneous", "pt" → "Patient", "physiol" → "Physiological", "param" → "Parameters", "chrnc" → "Chronic", "optx" → "Open Treatment", "rpm" → "Remote Patient Monitoring", "rem" → "Remote", "prsmv" → "Presumptive", "obs" → "Observation")
- Use Title Case for all descriptions
- Keep drug names, brand names, and manufacturer names in their standard casing
- Keep numeric values (minutes, sizes, dosages) as-is
- If the abbreviated description is ambiguous, use the HCPCS code to determine the correct meaning
- Do NOT add information that isn't implied by the original description
- Keep descriptions concise but readable (aim for 3-10 words)
- For injection/drug codes (J-codes), keep the format "Injection, [Drug Name] [dose]"

Respond with ONLY a JSON object mapping each HCPCS code to its cleaned description. No other text."#;

/// Request body for `POST /v1/messages`
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: String,
    pub messages: Vec<Message>,
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl MessagesRequest {
    /// Build the request for one batch
    pub fn for_batch(config: &ServiceConfig, system: &str, items: &[Item]) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user_prompt(items),
            }],
        }
    }
}

/// The user turn: one `code: description` line per item, in batch order
pub fn user_prompt(items: &[Item]) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("{}: {}", item.id, item.original_text))
        .collect();
    format!(
        "Clean up these {} HCPCS descriptions:\n\n{}",
        items.len(),
        lines.join("\n")
    )
}

/// Response body of `POST /v1/messages`
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,

    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// One block of response content
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first text block, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CodeId;

    fn item(id: &str, text: &str) -> Item {
        Item::new(CodeId::new(id).unwrap(), text)
    }

    #[test]
    fn test_user_prompt_lists_items_in_order() {
        let prompt = user_prompt(&[item("99490", "Chrnc care mgmt svc 20 min"), item("J2785", "Regadenoson injection")]);
        assert_eq!(
            prompt,
            "Clean up these 2 HCPCS descriptions:\n\n99490: Chrnc care mgmt svc 20 min\nJ2785: Regadenoson injection"
        );
    }

    #[test]
    fn test_request_carries_fixed_parameters() {
        let config = ServiceConfig::default();
        let request = MessagesRequest::for_batch(&config, DEFAULT_SYSTEM_PROMPT, &[item("99213", "Office o/p est low 20 min")]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json["system"].as_str().unwrap().starts_with("You are a medical coding expert"));
    }

    #[test]
    fn test_first_text_skips_non_text_blocks() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking"},{"type":"text","text":"{}"}],"stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("{}"));
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }
}
