//! Application state and dependency injection.

use hub_openai::OpenAiClient;
use hub_vector::VectorIndex;

use crate::TRACING_TARGET_SERVICE;
use crate::service::{Result, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    openai_client: OpenAiClient,
    vector_index: VectorIndex,
    service_config: ServiceConfig,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Builds the shared OpenAI client and an empty vector index.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let service_state = Self {
            openai_client: config.connect_openai()?,
            vector_index: VectorIndex::new(),
            service_config: config.clone(),
        };

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            base_url = %config.openai_base_url,
            chat_model = %config.openai_chat_model,
            embedding_model = %config.openai_embedding_model,
            "Service state initialized"
        );

        Ok(service_state)
    }

    /// Returns the shared vector index.
    pub fn vector_index(&self) -> &VectorIndex {
        &self.vector_index
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(openai_client: OpenAiClient);
impl_di!(vector_index: VectorIndex);
impl_di!(service_config: ServiceConfig);

#[cfg(test)]
mod tests {
    use axum::extract::FromRef;

    use super::*;

    #[test]
    fn clones_share_the_vector_index() -> anyhow::Result<()> {
        let state = ServiceState::from_config(&ServiceConfig::default())?;
        let index = VectorIndex::from_ref(&state);

        index.index_vectors("c1", [hub_vector::VectorRecord::new("a", "alpha", vec![1.0])]);
        assert_eq!(state.clone().vector_index().corpus_len("c1"), 1);
        Ok(())
    }
}
