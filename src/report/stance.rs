//! Per-question stance analysis.
//!
//! Aggregates comments into per-stance buckets, then either returns the
//! cached analysis or asks the text generator for a new one and
//! persists it.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::ReportError;
use crate::llm::TextGenerator;
use crate::models::{
    Comment, QuestionAnalysis, QuestionAnalysisRecord, Stance, StanceBucket, StanceEntry,
};
use crate::prompts;
use crate::store::AnalysisStore;

/// Bucket comments by stance for one question.
///
/// Pure and deterministic. Every declared stance gets an entry, even
/// with zero matching comments. Comments without an assignment for this
/// question, without extracted content, or assigned to an undeclared
/// stance id are skipped silently. Comment input order is preserved.
pub fn aggregate_stances(
    comments: &[Comment],
    stances: &[Stance],
    question_id: &str,
) -> StanceBucket {
    let mut bucket = StanceBucket::new();
    for stance in stances {
        bucket.insert(stance.id.clone(), StanceEntry::default());
    }

    for comment in comments {
        let Some(assignment) = comment.assignment_for(question_id) else {
            continue;
        };
        let Some(content) = comment.content() else {
            continue;
        };
        if let Some(entry) = bucket.get_mut(&assignment.stance_id) {
            entry.count += 1;
            entry.comments.push(content.to_string());
        }
    }

    bucket
}

/// Generates and caches per-question stance analyses.
pub struct StanceReportGenerator {
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn AnalysisStore>,
}

impl StanceReportGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, store: Arc<dyn AnalysisStore>) -> Self {
        Self { generator, store }
    }

    /// Analyze the stances taken on one question.
    ///
    /// Unless `force_regenerate` is set, a cached record for
    /// (project id, question id) is returned verbatim without any model
    /// call. Otherwise the bucket is aggregated, the analysis generated
    /// and the record upserted. All failures are logged and propagated
    /// unchanged.
    pub async fn analyze(
        &self,
        project_id: &str,
        question_text: &str,
        comments: &[Comment],
        stances: &[Stance],
        question_id: &str,
        force_regenerate: bool,
    ) -> Result<QuestionAnalysis, ReportError> {
        if !force_regenerate {
            let cached = self
                .store
                .find_question_analysis(project_id, question_id)
                .map_err(|e| {
                    error!("Cache lookup failed for question {}: {}", question_id, e);
                    ReportError::CacheLookup(e)
                })?;

            if let Some(record) = cached {
                info!("Using cached analysis for question {}", question_id);
                return Ok(QuestionAnalysis {
                    question: question_text.to_string(),
                    stance_analysis: record.stance_analysis,
                    analysis: record.analysis,
                });
            }
            debug!("No cached analysis for question {}", question_id);
        }

        let bucket = aggregate_stances(comments, stances, question_id);
        let prompt = prompts::question_report_prompt(question_text, &bucket, stances);

        info!("Generating analysis for question {}", question_id);
        let analysis = self.generator.generate(&prompt).await.map_err(|e| {
            error!("Analysis generation failed for question {}: {}", question_id, e);
            ReportError::Generation(e)
        })?;
        debug!(
            "Generated {} chars of analysis for question {}",
            analysis.len(),
            question_id
        );

        let now = Utc::now();
        self.store
            .upsert_question_analysis(QuestionAnalysisRecord {
                project_id: project_id.to_string(),
                question_id: question_id.to_string(),
                analysis: analysis.clone(),
                stance_analysis: bucket.clone(),
                created_at: now,
                updated_at: now,
            })
            .map_err(|e| {
                error!("Failed to persist analysis for question {}: {}", question_id, e);
                ReportError::Persistence(e)
            })?;
        debug!("Persisted analysis for question {}", question_id);

        Ok(QuestionAnalysis {
            question: question_text.to_string(),
            stance_analysis: bucket,
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockGenerator {
        calls: AtomicUsize,
        response: String,
    }

    impl MockGenerator {
        fn new(response: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: response.to_string(),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("model unavailable"))
        }
    }

    fn make_stances() -> Vec<Stance> {
        vec![
            Stance {
                id: "a".to_string(),
                name: "Pro".to_string(),
            },
            Stance {
                id: "b".to_string(),
                name: "Con".to_string(),
            },
        ]
    }

    fn make_comment(content: Option<&str>, question_id: &str, stance_id: &str) -> Comment {
        Comment {
            extracted_content: content.map(String::from),
            stances: vec![crate::models::StanceAssignment {
                question_id: question_id.to_string(),
                stance_id: stance_id.to_string(),
            }],
        }
    }

    #[test]
    fn test_aggregate_one_entry_per_declared_stance() {
        let bucket = aggregate_stances(&[], &make_stances(), "q1");

        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket["a"], StanceEntry::default());
        assert_eq!(bucket["b"], StanceEntry::default());
    }

    #[test]
    fn test_aggregate_example() {
        let comments = vec![
            make_comment(Some("x"), "q1", "a"),
            make_comment(Some("y"), "q1", "b"),
            make_comment(None, "q1", "a"),
        ];

        let bucket = aggregate_stances(&comments, &make_stances(), "q1");

        assert_eq!(bucket["a"].count, 1);
        assert_eq!(bucket["a"].comments, vec!["x"]);
        assert_eq!(bucket["b"].count, 1);
        assert_eq!(bucket["b"].comments, vec!["y"]);
    }

    #[test]
    fn test_aggregate_count_matches_comment_list() {
        let comments = vec![
            make_comment(Some("one"), "q1", "a"),
            make_comment(Some("two"), "q1", "a"),
            make_comment(Some("three"), "q1", "b"),
        ];

        let bucket = aggregate_stances(&comments, &make_stances(), "q1");

        for entry in bucket.values() {
            assert_eq!(entry.count, entry.comments.len());
        }
        assert_eq!(bucket["a"].comments, vec!["one", "two"]);
    }

    #[test]
    fn test_aggregate_skips_other_questions() {
        let comments = vec![make_comment(Some("x"), "q2", "a")];
        let bucket = aggregate_stances(&comments, &make_stances(), "q1");
        assert_eq!(bucket["a"].count, 0);
    }

    #[test]
    fn test_aggregate_drops_undeclared_stance_id() {
        let comments = vec![make_comment(Some("x"), "q1", "nonexistent")];
        let bucket = aggregate_stances(&comments, &make_stances(), "q1");

        assert_eq!(bucket.len(), 2);
        assert!(bucket.values().all(|e| e.count == 0));
    }

    #[test]
    fn test_aggregate_skips_empty_content() {
        let comments = vec![make_comment(Some(""), "q1", "a")];
        let bucket = aggregate_stances(&comments, &make_stances(), "q1");
        assert_eq!(bucket["a"].count, 0);
    }

    #[tokio::test]
    async fn test_analyze_generates_and_persists() {
        let generator = Arc::new(MockGenerator::new("the analysis"));
        let store = Arc::new(MemoryStore::new());
        let reporter = StanceReportGenerator::new(generator.clone(), store.clone());

        let comments = vec![make_comment(Some("x"), "q1", "a")];
        let result = reporter
            .analyze("p1", "Question?", &comments, &make_stances(), "q1", false)
            .await
            .unwrap();

        assert_eq!(result.question, "Question?");
        assert_eq!(result.analysis, "the analysis");
        assert_eq!(result.stance_analysis["a"].count, 1);
        assert_eq!(generator.call_count(), 1);

        let record = store.find_question_analysis("p1", "q1").unwrap().unwrap();
        assert_eq!(record.analysis, "the analysis");
    }

    #[tokio::test]
    async fn test_analyze_is_idempotent_on_cache_hit() {
        let generator = Arc::new(MockGenerator::new("the analysis"));
        let store = Arc::new(MemoryStore::new());
        let reporter = StanceReportGenerator::new(generator.clone(), store);

        let comments = vec![make_comment(Some("x"), "q1", "a")];
        let stances = make_stances();

        let first = reporter
            .analyze("p1", "Question?", &comments, &stances, "q1", false)
            .await
            .unwrap();
        let second = reporter
            .analyze("p1", "Question?", &comments, &stances, "q1", false)
            .await
            .unwrap();

        // Second call only reads the cache
        assert_eq!(generator.call_count(), 1);
        assert_eq!(first.analysis, second.analysis);
        assert_eq!(first.stance_analysis, second.stance_analysis);
        assert_eq!(first.question, second.question);
    }

    #[tokio::test]
    async fn test_analyze_force_regenerates_despite_cache() {
        let generator = Arc::new(MockGenerator::new("the analysis"));
        let store = Arc::new(MemoryStore::new());
        let reporter = StanceReportGenerator::new(generator.clone(), store.clone());

        let comments = vec![make_comment(Some("x"), "q1", "a")];
        let stances = make_stances();

        reporter
            .analyze("p1", "Question?", &comments, &stances, "q1", false)
            .await
            .unwrap();
        reporter
            .analyze("p1", "Question?", &comments, &stances, "q1", true)
            .await
            .unwrap();

        assert_eq!(generator.call_count(), 2);
        // Still exactly one record for the key
        assert!(store.find_question_analysis("p1", "q1").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_analyze_propagates_generation_failure() {
        let reporter =
            StanceReportGenerator::new(Arc::new(FailingGenerator), Arc::new(MemoryStore::new()));

        let err = reporter
            .analyze("p1", "Question?", &[], &make_stances(), "q1", false)
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::Generation(_)));
    }
}
