use crate::extract::ExtractionRequest;
use crate::models::InsightCategory;

/// System prompt for insight extraction
pub const SYSTEM_PROMPT: &str = r#"You are an expert analyst extracting actionable insights from sales call transcripts.

You MUST follow these rules:
1. Only report what was actually said or clearly implied in the transcript. Do not invent details.
2. Direct quotes MUST be copied verbatim from the transcript.
3. Rate confidence as "high" (explicitly stated), "medium" (strongly implied) or "low" (inferred).
4. Output MUST go through the submit_insights tool, with every category present (use an empty list when nothing applies)."#;

/// Build the user prompt for one call
pub fn build_extraction_prompt(request: &ExtractionRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str("Analyze the following transcript and extract insights into exactly 6 categories.\n");
    prompt.push_str("For each category, provide 3-10 specific, actionable insights based on what was discussed.\n\n");

    prompt.push_str("## Transcript Metadata\n");
    prompt.push_str(&format!("- Call Date: {}\n", request.call_date));
    prompt.push_str(&format!("- Sales Rep: {}\n", request.rep_name));
    prompt.push_str(&format!("- Company: {}\n", request.company_name));
    prompt.push_str(&format!("- Call Type: {}\n\n", request.call_type));

    prompt.push_str("## Categories\n");
    for category in InsightCategory::ALL {
        prompt.push_str(&format!("- {}: {}\n", category.key(), category.description()));
    }
    prompt.push('\n');

    prompt.push_str("## Transcript\n");
    prompt.push_str(&request.transcript_text);
    prompt.push_str("\n\n");

    prompt.push_str("## Instructions\n");
    prompt.push_str("1. Be specific - extract actual content from the call, not generic advice\n");
    prompt.push_str("2. Include a direct quote whenever one supports the insight\n");
    prompt.push_str("3. Give a timestamp hint when the transcript shows one near the quote\n");
    prompt.push_str("4. For social messaging, pick punchy 1-2 sentence quotes that would work on LinkedIn\n");
    prompt.push_str("5. For testimonials, capture genuine positive statements with attribution context\n");
    prompt.push_str("6. For product recommendations, name the specific features or integrations mentioned\n");
    prompt.push_str("7. For FAQs, frame each insight as a question a prospect might ask\n");
    prompt.push_str("8. For blog topics, suggest specific article titles based on the pain points discussed\n");

    prompt
}
