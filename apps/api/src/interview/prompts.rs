// Interview LLM prompt templates.
// All prompts for the interview module are defined here.

/// Question generation prompt template.
/// Replace: {difficulty}, {role}, {asked_questions}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate one {difficulty} level interview question for a {role} position.

The question must:
1. Be answerable in a few paragraphs of free text
2. Match the {difficulty} level, neither easier nor harder
3. Be different in topic and wording from every previously asked question

PREVIOUSLY ASKED QUESTIONS:
{asked_questions}

Return ONLY the question text. No numbering, no preamble, no quotes."#;

/// Placeholder used when no question has been asked yet.
pub const NO_PREVIOUS_QUESTIONS: &str = "(none)";

/// Answer evaluation prompt template.
/// Replace: {role}, {difficulty}, {question}, {answer}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"As an expert interviewer for {role} positions, evaluate the following answer to a {difficulty} level question.

Question: {question}
Answer: {answer}

Please provide:
1. A score out of 10 (just the number)
2. Detailed feedback on what was good and what could be improved
3. Specific recommendations for improvement

Format your response as:
SCORE: [score]
FEEDBACK: [feedback]
RECOMMENDATIONS: [recommendations]"#;
