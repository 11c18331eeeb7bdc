//! Prompts for remote extraction and proposal drafting

use rfpilot_domain::{Category, CompanyProfile, CompletionRequest, Requirement, Rfp, ToolSpec};
use serde_json::json;

/// Name of the structured-output tool the remote collaborator must call
pub const EXTRACTION_TOOL_NAME: &str = "extract_rfp_data";

/// Builds the extraction request for one document
pub struct PromptBuilder<'a> {
    text: &'a str,
    max_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder; `text` is capped to `max_chars` characters
    pub fn new(text: &'a str, max_chars: usize) -> Self {
        Self { text, max_chars }
    }

    /// The document text that will be sent
    pub fn document_text(&self) -> &'a str {
        truncate_chars(self.text, self.max_chars)
    }

    /// Build the complete extraction request
    pub fn build(&self) -> CompletionRequest {
        let mut user = String::new();
        user.push_str("Analyze this RFP document and extract the information:\n\n");
        user.push_str(self.document_text());

        CompletionRequest::new(extraction_instructions(), user).with_tool(extraction_tool())
    }
}

/// Cap `text` to its first `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn extraction_instructions() -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}\n\nRequirement categories: {}. Use Technical when nothing else fits.\n\n{}",
        EXTRACTION_INSTRUCTIONS, categories, MANDATORY_HEURISTIC
    )
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert at analyzing RFP (Request for Proposal) documents.
Extract the project title, client organization, a short description, the submission deadline,
the budget range with its currency, the required technologies, and every specific requirement.

Rules:
- Dates must use the ISO format YYYY-MM-DD
- Budgets are plain numbers without symbols or thousands separators (1.5M is 1500000)
- Currency is an ISO 4217 code such as USD, EUR or GBP
- Leave a field out when the document does not state it; never guess"#;

const MANDATORY_HEURISTIC: &str = r#"A requirement is mandatory when it uses "must", "shall", "required" or "mandatory".
Mandatory requirements have high priority; others are medium unless the document says otherwise."#;

/// JSON-schema tool describing the extraction record
pub fn extraction_tool() -> ToolSpec {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

    let parameters = json!({
        "type": "object",
        "properties": {
            "title": {"type": "string", "description": "Project title"},
            "client_name": {"type": "string", "description": "Issuing organization"},
            "description": {"type": "string", "description": "Brief project description"},
            "deadline": {"type": "string", "description": "Submission deadline (YYYY-MM-DD)"},
            "budget_min": {"type": "number", "description": "Minimum budget"},
            "budget_max": {"type": "number", "description": "Maximum budget"},
            "currency": {"type": "string", "description": "ISO 4217 currency code"},
            "required_technologies": {
                "type": "array",
                "items": {"type": "string"}
            },
            "requirements": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "requirement_text": {"type": "string"},
                        "category": {"type": "string", "enum": categories},
                        "priority": {"type": "string", "enum": ["high", "medium", "low"]},
                        "is_mandatory": {"type": "boolean"}
                    },
                    "required": ["requirement_text", "category", "priority", "is_mandatory"]
                }
            }
        },
        "required": ["requirements"]
    });

    ToolSpec {
        name: EXTRACTION_TOOL_NAME.to_string(),
        description: "Extract structured data from an RFP document".to_string(),
        parameters: parameters.to_string(),
    }
}

/// Builds the free-text proposal drafting request
pub struct DraftPromptBuilder<'a> {
    rfp: &'a Rfp,
    requirements: &'a [Requirement],
    company: &'a CompanyProfile,
}

impl<'a> DraftPromptBuilder<'a> {
    /// Create a drafting prompt for `rfp` written on behalf of `company`
    pub fn new(rfp: &'a Rfp, requirements: &'a [Requirement], company: &'a CompanyProfile) -> Self {
        Self {
            rfp,
            requirements,
            company,
        }
    }

    /// Build the drafting request (no tool; the reply is prose)
    pub fn build(&self) -> CompletionRequest {
        let mut prompt = String::new();
        prompt.push_str(DRAFT_INSTRUCTIONS);
        prompt.push_str("\n\nCOMPANY DATA:\n");
        prompt.push_str(&self.company_context());
        prompt.push_str("\nRFP DETAILS:\n");
        prompt.push_str(&self.rfp_context());
        prompt.push_str(
            "\nWrite a complete proposal following the structure above, citing company evidence for each requirement.",
        );

        CompletionRequest::new(
            "You are an expert RFP response writer who creates compelling, professional proposals.",
            prompt,
        )
    }

    fn company_context(&self) -> String {
        let c = self.company;
        let mut out = String::new();

        out.push_str(&format!("Company: {}\n", c.name));
        out.push_str(&format!("Industry: {}\n", or_unspecified(c.industry.as_deref())));
        out.push_str(&format!(
            "Size: {}\n",
            c.employee_count
                .map(|n| format!("{} employees", n))
                .unwrap_or_else(|| "Not specified".to_string())
        ));
        out.push_str(&format!(
            "Available funds: {}\n",
            c.available_funds
                .map(format_amount)
                .unwrap_or_else(|| "Not specified".to_string())
        ));
        out.push_str(&format!("Technologies: {}\n", join_or(&c.technologies, "None specified")));
        out.push_str(&format!("Description: {}\n", or_unspecified(c.description.as_deref())));

        out.push_str("\nCapabilities:\n");
        if c.capabilities.is_empty() {
            out.push_str("No capabilities listed\n");
        }
        for cap in &c.capabilities {
            out.push_str(&format!(
                "- {}: {} ({})\n",
                cap.category,
                cap.capability,
                cap.proficiency_level.as_deref().unwrap_or("unrated")
            ));
        }

        out.push_str("\nPast projects:\n");
        if c.past_projects.is_empty() {
            out.push_str("No past projects listed\n");
        }
        for project in &c.past_projects {
            out.push_str(&format!(
                "- {} for {}\n  Budget: {}\n  Technologies: {}\n  Outcome: {}\n",
                project.project_name,
                project.client_name.as_deref().unwrap_or("undisclosed client"),
                project
                    .budget
                    .map(format_amount)
                    .unwrap_or_else(|| "undisclosed".to_string()),
                join_or(&project.technologies_used, "N/A"),
                project.outcome.as_deref().unwrap_or("N/A"),
            ));
        }

        out
    }

    fn rfp_context(&self) -> String {
        let r = self.rfp;
        let currency = r.currency.as_deref().unwrap_or("USD");
        let mut out = String::new();

        out.push_str(&format!("RFP: {}\n", r.title));
        out.push_str(&format!("Client: {}\n", or_unspecified(r.client_name.as_deref())));
        out.push_str(&format!("Deadline: {}\n", or_unspecified(r.deadline.as_deref())));
        let budget = match (r.budget_min, r.budget_max) {
            (Some(min), Some(max)) => {
                format!("{} - {} {}", format_amount(min), format_amount(max), currency)
            }
            (None, Some(max)) => format!("up to {} {}", format_amount(max), currency),
            (Some(min), None) => format!("from {} {}", format_amount(min), currency),
            (None, None) => "Not specified".to_string(),
        };
        out.push_str(&format!("Budget: {}\n", budget));
        out.push_str(&format!("Description: {}\n", or_unspecified(r.description.as_deref())));
        out.push_str(&format!(
            "Required technologies: {}\n",
            join_or(&r.required_technologies, "Not specified")
        ));

        out.push_str("\nRequirements:\n");
        if self.requirements.is_empty() {
            out.push_str("No requirements listed\n");
        }
        for req in self.requirements {
            out.push_str(&format!(
                "- [{}] {} ({}, priority: {})\n",
                if req.is_mandatory { "MANDATORY" } else { "Optional" },
                req.requirement_text,
                req.category.as_str(),
                req.priority.as_str()
            ));
        }

        out
    }
}

const DRAFT_INSTRUCTIONS: &str = r#"You are writing a proposal in response to the RFP below.

INSTRUCTIONS:
- Open with an executive summary of at most 300 words
- Address EVERY requirement with specific evidence from the company data
- Reference actual past projects from the company data
- NEVER invent capabilities; use only the data provided
- Mark anything uncertain with [VERIFY: ...]

STRUCTURE:
1. Executive Summary
2. Technical Approach and Capability Mapping
3. Commercial Proposal
4. Compliance and Service Levels
5. Implementation Plan
6. Relevant Experience
7. Why Us
8. Conclusion"#;

fn or_unspecified(value: Option<&str>) -> &str {
    value.unwrap_or("Not specified")
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Format an amount with thousands separators (`1500000` -> `1,500,000`)
fn format_amount(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}
