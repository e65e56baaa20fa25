use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use assignment_ingestion_service::domain::entities::document::{
    Document, DocumentIngestionUpdate,
};
use assignment_ingestion_service::ports::completions_repository::{
    CompletionsRepository, CompletionsRepositoryError,
};
use assignment_ingestion_service::ports::document_repository::{
    DocumentRepository, DocumentRepositoryError,
};
use assignment_ingestion_service::ports::embeddings_repository::{
    EmbeddingsRepository, EmbeddingsRepositoryError,
};
use assignment_ingestion_service::ports::source_file_repository::{
    SourceFileRepository, SourceFileRepositoryError,
};

/// Builds an in-memory single-page PDF carrying `text`
pub fn pdf_with_text(text: &str) -> Vec<u8> {
    let mut document = PdfDocument::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = document.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).unwrap();
    bytes
}

/// Deterministic embedding: identical texts map onto identical vectors
pub fn fake_embedding(text: &str) -> Vec<f32> {
    let mut embedding = vec![0.0_f32; 8];
    for (i, byte) in text.bytes().enumerate() {
        embedding[i % 8] += byte as f32;
    }
    embedding
}

pub fn document(
    folder: &str,
    uploaded_date: DateTime<Utc>,
    embedding: Option<Vec<f32>>,
) -> Document {
    Document {
        id: Uuid::new_v4(),
        folder: folder.to_string(),
        uploaded_date,
        deadline: None,
        content: None,
        page_count: None,
        sentence_count: None,
        embedding,
        student_name: None,
        student_id: None,
        plagiarism_score: None,
        plagiarism_detected: None,
    }
}

/// Document store fake recording every write
pub struct InMemoryDocumentRepository {
    documents: Mutex<Vec<Document>>,
    updates: Mutex<Vec<(Uuid, DocumentIngestionUpdate)>>,
}

impl InMemoryDocumentRepository {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: Mutex::new(documents),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn updates(&self) -> Vec<(Uuid, DocumentIngestionUpdate)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn get_document(&self, id: Uuid) -> Result<Document, DocumentRepositoryError> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|document| document.id == id)
            .cloned()
            .ok_or(DocumentRepositoryError::NotFound(id))
    }

    async fn list_prior_documents(
        &self,
        folder: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|document| document.folder == folder && document.uploaded_date < before)
            .cloned()
            .collect())
    }

    async fn update_ingestion_fields(
        &self,
        id: Uuid,
        update: &DocumentIngestionUpdate,
    ) -> Result<(), DocumentRepositoryError> {
        self.updates.lock().unwrap().push((id, update.clone()));
        Ok(())
    }
}

/// Source file fake serving one fixed payload
pub struct FakeSourceFileRepository {
    bytes: Vec<u8>,
}

impl FakeSourceFileRepository {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

#[async_trait]
impl SourceFileRepository for FakeSourceFileRepository {
    async fn get_file(&self, _url: &str) -> Result<Vec<u8>, SourceFileRepositoryError> {
        Ok(self.bytes.clone())
    }
}

/// Embedding service fake, deterministic on the input text
pub struct FakeEmbeddingsRepository {
    pub calls: AtomicUsize,
}

impl FakeEmbeddingsRepository {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingsRepository for FakeEmbeddingsRepository {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>, EmbeddingsRepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(fake_embedding(text))
    }
}

/// Model service fake counting calls per operation
pub struct FakeCompletionsRepository {
    pub text_calls: AtomicUsize,
    pub structured_calls: AtomicUsize,
    pub structured_response: JsonValue,
    pub fail_text_generation: bool,
}

impl FakeCompletionsRepository {
    pub fn new() -> Self {
        Self {
            text_calls: AtomicUsize::new(0),
            structured_calls: AtomicUsize::new(0),
            structured_response: json!({ "name": "Alex Doe", "id": 1234567890_u64 }),
            fail_text_generation: false,
        }
    }

    pub fn failing_text_generation() -> Self {
        Self {
            fail_text_generation: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl CompletionsRepository for FakeCompletionsRepository {
    async fn generate_text(
        &self,
        _system: Option<&str>,
        user: &str,
    ) -> Result<String, CompletionsRepositoryError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_text_generation {
            return Err(CompletionsRepositoryError::Transport(
                "connection reset by peer".to_string(),
            ));
        }

        let excerpt: String = user.chars().take(40).collect();
        Ok(format!("generated from: {}", excerpt))
    }

    async fn generate_structured(
        &self,
        _prompt: &str,
        _schema: &JsonValue,
    ) -> Result<JsonValue, CompletionsRepositoryError> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.structured_response.clone())
    }
}
