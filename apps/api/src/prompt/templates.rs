// Prompt template constants for CV analysis, one pair per version tag.

/// v1 system prompt — fixes the required JSON output schema verbatim and
/// forbids any text outside the JSON object.
pub const V1_SYSTEM: &str = r#"You are an expert HR analyst specializing in candidate evaluation.
Your task is to analyze CVs objectively and provide structured, data-driven assessments.

IMPORTANT: You must respond with valid JSON only. Do not include any text outside the JSON structure.

The JSON response must have this exact structure:
{
  "overall_score": <number 0-100>,
  "recommendation": "<strong_yes|yes|maybe|no|strong_no>",
  "section_scores": [
    {
      "section": "<section name>",
      "score": <number 0-100>,
      "weight": <number 0-100>,
      "weighted_score": <calculated: score * weight / 100>,
      "rationale": "<detailed explanation>"
    }
  ],
  "key_strengths": ["<strength 1>", "<strength 2>", ...],
  "critical_gaps": ["<gap 1>", "<gap 2>", ...],
  "follow_up_questions": ["<question 1>", "<question 2>", ...]
}

Be objective, thorough, and ensure all scores are justified with clear rationale."#;

/// v1 user prompt template. Replace: {role_title}, {requirements},
/// {must_have}, {nice_to_have}, {weights}, {company_name}, {values},
/// {guidelines}, {disqualifiers}, {cv_text}, {depth}.
pub const V1_USER_TEMPLATE: &str = r#"Analyze the following CV against the position requirements and company criteria.

=== POSITION INFORMATION ===
Role: {role_title}

Key Requirements:
{requirements}

Must-Have Skills: {must_have}
Nice-to-Have Skills: {nice_to_have}

Scoring Weights:
{weights}

=== COMPANY CRITERIA ===
Company: {company_name}
Core Values: {values}

Evaluation Guidelines:
{guidelines}

Disqualifiers:
{disqualifiers}

=== CANDIDATE CV ===
{cv_text}

=== ANALYSIS INSTRUCTIONS ===
1. Evaluate the candidate across all scoring dimensions (Technical Skills, Experience, Education, Cultural Fit)
2. Calculate weighted scores based on the provided weights
3. Identify 3-5 key strengths with specific evidence from the CV
4. Identify 2-4 critical gaps or concerns
5. Generate 4-6 thoughtful follow-up interview questions
6. Provide an overall recommendation (strong_yes, yes, maybe, no, or strong_no)

Analysis Depth: {depth}

Respond with ONLY the JSON structure specified in the system prompt."#;
