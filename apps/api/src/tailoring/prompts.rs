// All LLM prompt constants for the Tailoring module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for structure discovery.
pub const DISCOVERY_SYSTEM: &str = "You are an expert resume analyst. \
    You identify which sections a resume document contains. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object.";

/// Structure discovery prompt. Sent alongside the PDF attachment.
pub const DISCOVERY_PROMPT: &str = r#"Analyze the attached PDF resume and return ONLY a JSON object listing the sections it contains.

Return format:
{
  "sections": ["personalInfo", "education", "experience", "projects", "skills", "achievements"]
}

Use ONLY these tokens:
- Personal info (name, contact details) → "personalInfo"
- Professional summary / objective → "professionalSummary"
- Education → "education"
- Work experience → "experience"
- Projects → "projects"
- Skills → "skills"
- Achievements / awards → "achievements"
- Certifications → "certifications"

Only include sections that actually exist in the document. If a section is not there, leave it out.
Return ONLY the JSON with the sections array."#;

/// System prompt for content tailoring.
pub const TAILORING_SYSTEM: &str = "You are an expert resume optimization specialist. \
    You rewrite resumes for a specific job without changing their structure or facts. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object.";

/// Tailoring prompt template.
/// Replace `{job_details}`, `{job_description}` and `{no_fabrication}` before sending.
pub const TAILORING_PROMPT_TEMPLATE: &str = r#"Tailor the attached PDF resume for the job described below.

JOB DETAILS:
{job_details}

JOB DESCRIPTION:
{job_description}

STRUCTURE RULES:
1. Identify every section present in the original document.
2. Output a JSON object with ONLY those sections. Never add a section the original does not have.
3. Do not assume any section is required except personalInfo.

MODIFICATION RULES (only for sections that exist in the original):
- experience: keep the EXACT job titles, companies and durations. Rewrite description lines to emphasise job-relevant keywords.
- projects: keep the EXACT project names. Rewrite descriptions and achievements to emphasise relevant technologies.
- skills: reorder so job-relevant skills come first and group similar technologies together.
- every other section (personalInfo, professionalSummary, education, achievements, certifications): copy EXACTLY as in the original.

{no_fabrication}

OUTPUT SHAPE (include only the keys for sections that exist):
{
  "personalInfo": {"name": "", "email": "", "phone": "", "location": "", "linkedin": "", "github": "", "website": ""},
  "professionalSummary": "",
  "education": [{"degree": "", "institution": "", "year": "", "gpa": "", "relevantCourses": []}],
  "experience": [{"title": "", "company": "", "duration": "", "description": [], "technologies": [], "achievements": []}],
  "projects": [{"name": "", "description": "", "technologies": [], "achievements": [], "url": "", "github": ""}],
  "skills": {"technical": [], "frameworks": [], "tools": [], "databases": [], "languages": [], "soft": []},
  "achievements": [],
  "certifications": [{"name": "", "issuer": "", "date": "", "url": "", "expiryDate": ""}]
}

Before answering, confirm the JSON has EXACTLY the sections of the original resume: no more, no less.
Return ONLY the JSON, no additional text or explanations."#;
