use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::document::Document;

/// Cosine similarity between two vectors: `dot(a,b) / (‖a‖ · ‖b‖)`, in [-1, 1]
///
/// Returns 0 when either vector has a zero norm.
/// Accumulates in f64: products of large f32 components overflow f32.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum();
    let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)) as f32
}

/// One prior submission whose similarity exceeded the threshold
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlagiarismMatch {
    pub document_id: Uuid,
    pub similarity: f32,
}

/// Outcome of scoring one submission against its prior submissions.
/// Ephemeral: reduced onto the document record, never persisted standalone.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlagiarismAssessment {
    /// Maximum retained similarity, 0 when no pair is retained
    pub score: f32,
    /// True iff `score` strictly exceeds the threshold
    pub detected: bool,
    pub matches: Vec<PlagiarismMatch>,
}

/// Pairwise comparison of a submission embedding against prior submissions
/// of the same folder. Cost is linear in the number of priors.
#[derive(Debug, Clone)]
pub struct PlagiarismScorer {
    threshold: f32,
}

impl PlagiarismScorer {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Scores `current_embedding` against every prior document
    ///
    /// Priors with a missing embedding, or one of a different dimension,
    /// are skipped: upstream data may be incomplete.
    pub fn assess(
        &self,
        current_embedding: &[f32],
        prior_documents: &[Document],
    ) -> PlagiarismAssessment {
        let matches: Vec<PlagiarismMatch> = prior_documents
            .iter()
            .filter_map(|prior| {
                let embedding = prior.embedding.as_ref()?;
                if embedding.len() != current_embedding.len() {
                    debug!(
                        document_id = %prior.id,
                        "Skipping prior document with mismatched embedding dimension"
                    );
                    return None;
                }

                let similarity = cosine_similarity(current_embedding, embedding);
                (similarity > self.threshold).then(|| PlagiarismMatch {
                    document_id: prior.id,
                    similarity,
                })
            })
            .collect();

        let score = matches
            .iter()
            .map(|m| m.similarity)
            .fold(0.0_f32, f32::max);

        PlagiarismAssessment {
            score,
            detected: score > self.threshold,
            matches,
        }
    }
}
