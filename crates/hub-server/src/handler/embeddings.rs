//! Embeddings handlers backed by the in-memory vector index.
//!
//! Documents are embedded with the caller's key and appended to a named
//! corpus; searches embed the query and rank the corpus by cosine
//! similarity. Corpora live for the lifetime of the process.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use hub_openai::OpenAiClient;
use hub_vector::VectorIndex;

use crate::extract::{Json, OpenAiKey, Path, ValidateJson};
use crate::handler::request::{CorpusPathParams, IndexDocumentsRequest, SearchRequest};
use crate::handler::response::{
    CorpusResponse, ErrorResponse, IndexResponse, SearchResponse, SearchResult,
};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for embeddings operations.
const TRACING_TARGET: &str = "hub_server::handler::embeddings";

/// Embeds documents and appends them to a corpus.
#[tracing::instrument(skip_all, fields(corpus_id = %request.corpus_id))]
async fn index_documents(
    State(openai): State<OpenAiClient>,
    State(vector_index): State<VectorIndex>,
    State(config): State<ServiceConfig>,
    OpenAiKey(api_key): OpenAiKey,
    ValidateJson(request): ValidateJson<IndexDocumentsRequest>,
) -> Result<(StatusCode, Json<IndexResponse>)> {
    if request.docs.is_empty() {
        return Err(ErrorKind::NoDocuments.into_error());
    }

    let model = request
        .model
        .as_deref()
        .unwrap_or(&config.openai_embedding_model);

    tracing::debug!(
        target: TRACING_TARGET,
        model = %model,
        documents = request.docs.len(),
        "Embedding documents"
    );

    let texts: Vec<String> = request.docs.iter().map(|doc| doc.text.clone()).collect();
    let embeddings = openai.create_embeddings(&api_key, model, texts).await?;

    let records: Vec<_> = request
        .docs
        .into_iter()
        .zip(embeddings)
        .enumerate()
        .map(|(position, (doc, embedding))| doc.into_record(position, embedding))
        .collect();

    let count = records.len();
    let total = vector_index.append_vectors(&request.corpus_id, records);

    tracing::info!(
        target: TRACING_TARGET,
        count,
        total,
        "Documents indexed"
    );

    Ok((StatusCode::OK, Json(IndexResponse { count, total })))
}

fn index_documents_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Index documents")
        .description(
            "Embeds the documents in one upstream call and appends them to the corpus. \
             Documents without an id are named `doc_{position}`.",
        )
        .response::<200, Json<IndexResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Embeds the query and returns the most similar documents.
#[tracing::instrument(skip_all, fields(corpus_id = %request.corpus_id, top_k = request.top_k))]
async fn search_documents(
    State(openai): State<OpenAiClient>,
    State(vector_index): State<VectorIndex>,
    State(config): State<ServiceConfig>,
    OpenAiKey(api_key): OpenAiKey,
    ValidateJson(request): ValidateJson<SearchRequest>,
) -> Result<(StatusCode, Json<SearchResponse>)> {
    if vector_index.corpus_len(&request.corpus_id) == 0 {
        return Err(ErrorKind::EmptyCorpus
            .with_resource("corpus")
            .with_context(format!("Corpus '{}' has no documents", request.corpus_id)));
    }

    let model = request
        .model
        .as_deref()
        .unwrap_or(&config.openai_embedding_model);

    let query_embedding = openai
        .create_embeddings(&api_key, model, request.query.clone())
        .await
        .map_err(|err| match err {
            hub_openai::Error::InvalidResponse(detail) => {
                ErrorKind::EmbeddingFailed.with_context(detail)
            }
            other => Error::from(other),
        })?
        .into_iter()
        .next()
        .ok_or_else(|| ErrorKind::EmbeddingFailed.into_error())?;

    let results: Vec<SearchResult> = vector_index
        .search(&request.corpus_id, &query_embedding, request.top_k)
        .into_iter()
        .map(Into::into)
        .collect();

    tracing::debug!(
        target: TRACING_TARGET,
        results = results.len(),
        "Search completed"
    );

    Ok((StatusCode::OK, Json(SearchResponse { results })))
}

fn search_documents_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Search corpus")
        .description(
            "Embeds the query and returns up to `topK` documents in descending \
             cosine similarity order.",
        )
        .response::<200, Json<SearchResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<500, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Lists the documents of a corpus without their embeddings.
#[tracing::instrument(skip_all, fields(corpus_id = %path_params.corpus_id))]
async fn get_corpus(
    State(vector_index): State<VectorIndex>,
    OpenAiKey(_): OpenAiKey,
    Path(path_params): Path<CorpusPathParams>,
) -> Result<(StatusCode, Json<CorpusResponse>)> {
    let records = vector_index.get_corpus(&path_params.corpus_id);

    tracing::debug!(
        target: TRACING_TARGET,
        count = records.len(),
        "Corpus listed"
    );

    let response = CorpusResponse::new(path_params.corpus_id, records);
    Ok((StatusCode::OK, Json(response)))
}

fn get_corpus_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List corpus")
        .description("Returns the documents of a corpus in insertion order. Unknown corpora are empty.")
        .response::<200, Json<CorpusResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/embeddings/index",
            post_with(index_documents, index_documents_docs),
        )
        .api_route(
            "/embeddings/search",
            post_with(search_documents, search_documents_docs),
        )
        .api_route(
            "/embeddings/corpora/{corpusId}",
            get_with(get_corpus, get_corpus_docs),
        )
        .with_path_items(|item| item.tag("Embeddings"))
}
