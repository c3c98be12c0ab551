//! Prompt construction.
//!
//! Pure string-building functions with no I/O, kept separate from the
//! generation client so they can be unit-tested without any model call.

use crate::models::{QuestionAnalysis, Stance, StanceBucket};

/// Placeholder substituted with the comment text by the caller of the
/// classification prompt.
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Special stance value: the comment expresses no clear position.
pub const NO_STANCE: &str = "no-stance";

/// Special stance value: the comment expresses a position outside the
/// given options.
pub const OTHER_STANCE: &str = "other-stance";

/// Build the prompt for classifying a single comment's stance toward a
/// question.
///
/// The returned text contains a `{content}` placeholder for the comment
/// body and requests a JSON response with `reasoning`, `stance`, and a
/// `confidence` value between 0 and 1.
#[allow(dead_code)] // Consumed by the comment-classification pipeline
pub fn stance_classification_prompt(
    question_text: &str,
    stance_options: &str,
    context: Option<&str>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Analyze the following comment and decide which stance it takes on the question \
         \"{}\". If no stance is clear, choose \"{}\".\n\n",
        question_text, NO_STANCE
    ));

    if let Some(context) = context {
        prompt.push_str(&format!("Background information:\n\"\"\"\n{}\n\"\"\"\n\n", context));
    }

    prompt.push_str(&format!("Comment:\n\"\"\"\n{}\n\"\"\"\n\n", CONTENT_PLACEHOLDER));
    prompt.push_str(&format!("Possible stances: \"{}\"\n\n", stance_options));

    prompt.push_str(&format!(
        "Notes:\n\
         - \"{}\": the comment does not take a clear stance on the question\n\
         - \"{}\": the comment takes a clear stance, but it matches none of the given options\n\
         - Do not read implied meaning into the comment; analyze only what is explicitly written\n\n",
        NO_STANCE, OTHER_STANCE
    ));

    prompt.push_str(
        "Respond in the following JSON format:\n\
         {\n\
         \x20 \"reasoning\": \"your reasoning\",\n\
         \x20 \"stance\": \"name of the stance\",\n\
         \x20 \"confidence\": confidence as a number from 0 to 1\n\
         }",
    );

    prompt
}

/// Build the analysis prompt for one question from its aggregated
/// stance bucket. Stances with zero comments are omitted.
pub fn question_report_prompt(
    question_text: &str,
    bucket: &StanceBucket,
    stances: &[Stance],
) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Read the stances taken on the question below and the comments behind each one. \
         Analyze the tendencies of each stance, the grounds for its arguments, and the \
         relationships between stances. Explain thoroughly so anyone can follow, while \
         staying specific and substantive.\n\n",
    );
    prompt.push_str(&format!("Question: {}\n\n", question_text));

    for (stance_id, entry) in bucket {
        if entry.count == 0 {
            continue;
        }
        let stance_name = stances
            .iter()
            .find(|s| &s.id == stance_id)
            .map(|s| s.name.as_str())
            .unwrap_or("Unknown");

        prompt.push_str(&format!(
            "Stance: {}\nComment count: {}\nComments:\n{}\n\n",
            stance_name,
            entry.count,
            entry.comments.join("\n")
        ));
    }

    prompt.push_str(
        "Points to analyze:\n\
         - The key arguments of each stance\n\
         - Points of conflict and common ground between stances\n\
         - Distinctive opinions and interesting viewpoints\n\n",
    );
    prompt.push_str(
        "Tips:\n\
         - Make heavy use of Markdown headings, bullet lists, and bold text for readability.\n\
         - Keep it concise enough that anyone can understand it at a glance.\n",
    );

    prompt
}

/// Build the project-level synthesis prompt from the ordered
/// per-question analyses.
pub fn project_report_prompt(
    project_name: &str,
    project_description: &str,
    analyses: &[QuestionAnalysis],
) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Below are per-question stance analyses for a public consultation project. \
         Write an overall report that synthesizes them: the big picture of the debate, \
         where opinion converges and diverges across questions, and what stands out.\n\n",
    );
    prompt.push_str(&format!("Project: {}\n", project_name));
    if !project_description.is_empty() {
        prompt.push_str(&format!("Description: {}\n", project_description));
    }
    prompt.push('\n');

    for analysis in analyses {
        prompt.push_str(&format!("## Question: {}\n\n", analysis.question));

        let distribution: Vec<String> = analysis
            .stance_analysis
            .iter()
            .filter(|(_, entry)| entry.count > 0)
            .map(|(stance_id, entry)| format!("{}: {}", stance_id, entry.count))
            .collect();
        if !distribution.is_empty() {
            prompt.push_str(&format!("Stance distribution: {}\n\n", distribution.join(", ")));
        }

        prompt.push_str(&format!("Analysis:\n{}\n\n", analysis.analysis));
    }

    prompt.push_str(
        "Tips:\n\
         - Make heavy use of Markdown headings, bullet lists, and bold text for readability.\n\
         - Keep it concise enough that anyone can understand it at a glance.\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StanceEntry;

    #[test]
    fn test_classification_prompt_structure() {
        let prompt = stance_classification_prompt("Should the park be expanded?", "Yes, No", None);

        assert!(prompt.contains("Should the park be expanded?"));
        assert!(prompt.contains("Possible stances: \"Yes, No\""));
        assert!(prompt.contains(CONTENT_PLACEHOLDER));
        assert!(prompt.contains(NO_STANCE));
        assert!(prompt.contains(OTHER_STANCE));
        assert!(prompt.contains("\"reasoning\""));
        assert!(prompt.contains("\"stance\""));
        assert!(prompt.contains("\"confidence\""));
        assert!(prompt.contains("explicitly written"));
        assert!(!prompt.contains("Background information"));
    }

    #[test]
    fn test_classification_prompt_with_context() {
        let prompt = stance_classification_prompt("Q?", "A, B", Some("City budget is limited."));

        assert!(prompt.contains("Background information"));
        assert!(prompt.contains("City budget is limited."));
    }

    #[test]
    fn test_question_report_prompt_skips_empty_stances() {
        let stances = vec![
            Stance {
                id: "pro".to_string(),
                name: "In favor".to_string(),
            },
            Stance {
                id: "con".to_string(),
                name: "Against".to_string(),
            },
        ];

        let mut bucket = StanceBucket::new();
        bucket.insert(
            "pro".to_string(),
            StanceEntry {
                count: 2,
                comments: vec!["good idea".to_string(), "long overdue".to_string()],
            },
        );
        bucket.insert("con".to_string(), StanceEntry::default());

        let prompt = question_report_prompt("Expand the park?", &bucket, &stances);

        assert!(prompt.contains("Question: Expand the park?"));
        assert!(prompt.contains("Stance: In favor"));
        assert!(prompt.contains("Comment count: 2"));
        assert!(prompt.contains("good idea"));
        assert!(prompt.contains("long overdue"));
        assert!(!prompt.contains("Stance: Against"));
    }

    #[test]
    fn test_question_report_prompt_unknown_stance_name() {
        let mut bucket = StanceBucket::new();
        bucket.insert(
            "ghost".to_string(),
            StanceEntry {
                count: 1,
                comments: vec!["?".to_string()],
            },
        );

        let prompt = question_report_prompt("Q?", &bucket, &[]);
        assert!(prompt.contains("Stance: Unknown"));
    }

    #[test]
    fn test_project_report_prompt_structure() {
        let mut bucket = StanceBucket::new();
        bucket.insert(
            "pro".to_string(),
            StanceEntry {
                count: 3,
                comments: vec![],
            },
        );

        let analyses = vec![QuestionAnalysis {
            question: "Expand the park?".to_string(),
            stance_analysis: bucket,
            analysis: "Most commenters support expansion.".to_string(),
        }];

        let prompt = project_report_prompt("Green City", "A city consultation.", &analyses);

        assert!(prompt.contains("Project: Green City"));
        assert!(prompt.contains("Description: A city consultation."));
        assert!(prompt.contains("## Question: Expand the park?"));
        assert!(prompt.contains("Stance distribution: pro: 3"));
        assert!(prompt.contains("Most commenters support expansion."));
    }

    #[test]
    fn test_project_report_prompt_empty_description_omitted() {
        let prompt = project_report_prompt("Green City", "", &[]);
        assert!(prompt.contains("Project: Green City"));
        assert!(!prompt.contains("Description:"));
    }
}
