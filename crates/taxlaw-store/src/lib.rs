//! Retrieval layer: embeddings, vector index adapters, and context rendering.

mod error;
pub use error::RetrievalError;

pub mod fakes;
mod index;
pub use index::{Embeddings, SearchMatch, VectorIndex};

mod openai;
pub use openai::OpenAiEmbeddings;

mod pinecone;
pub use pinecone::PineconeIndex;

mod retriever;
pub use retriever::{ContextRetriever, render_context};

#[cfg(feature = "lancedb")]
mod lance;
#[cfg(feature = "lancedb")]
pub use lance::{LanceIndex, PASSAGES_TABLE, Passage, PassageSource, read_passage_sources};
