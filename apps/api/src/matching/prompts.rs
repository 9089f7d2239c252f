// All LLM prompt constants for the matching module.

/// System prompt for preference extraction. Enforces JSON-only output.
pub const PREFERENCE_EXTRACT_SYSTEM: &str =
    "You are a job-search assistant for accounting professionals. \
    Extract structured job preferences from a free-text search request. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Extraction prompt template. Replace `{query}` before sending.
pub const PREFERENCE_EXTRACT_TEMPLATE: &str = r#"Extract job preferences from the search request below.

Return a JSON object with EXACTLY these keys and no others:
{
  "role": "audit manager",
  "location": "new york",
  "experience": "senior",
  "salary": "90000 - 110000"
}

Rules:
- "role": the job function or title the user is asking for (e.g. "tax accountant", "technology audit").
- "location": the city or region, if one is mentioned.
- "experience": the seniority band (e.g. "junior", "senior", "manager", "director").
- "salary": the salary expectation exactly as the user phrased it.
- Use null for every key the request does not specify. Never guess a value.
- Values are short lower-case phrases taken from the request itself.

SEARCH REQUEST:
{query}"#;
