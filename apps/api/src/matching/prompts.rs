// All LLM prompt constants for the matching module.

/// System prompt for CV analysis. Enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str = "You are an expert HR analyst who evaluates CV matches. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// CV analysis prompt template. Replace `{job_description}` and `{cv_text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"As an expert HR analyst, analyze the match between this job description and CV.
Return ONLY a JSON object without any additional text or markdown formatting.

Job Description:
{job_description}

CV:
{cv_text}

Response format (fill in the values):
{
  "matchPercentage": number between 0-100,
  "technicalSkillsMatch": {
    "matching": ["skill1", "skill2"],
    "missing": ["skill1", "skill2"],
    "score": number between 0-100
  },
  "experienceMatch": {
    "relevantExperience": ["experience1", "experience2"],
    "score": number between 0-100
  },
  "overallAnalysis": "detailed analysis string"
}"#;

/// Fills the analysis template in a single pass over the template, so
/// placeholder text inside either document is copied through literally.
pub fn build_analysis_prompt(job_description: &str, cv_text: &str) -> String {
    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[("{job_description}", job_description), ("{cv_text}", cv_text)],
    )
}

fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let capacity = template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match values.iter().find(|(key, _)| rest.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &rest[key.len()..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
