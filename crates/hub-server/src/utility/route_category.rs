use axum::http::Uri;

/// Route classification for metrics grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    Support,
    Embeddings,
    Knowledge,
    Files,
    Structured,
    Images,
    Video,
    Realtime,
    Connectors,
    Documentation,
    Unknown,
}

impl RouteCategory {
    /// Categorizes a route based on its URI path.
    pub fn from_uri(uri: &Uri) -> Self {
        let Some(path) = uri.path().strip_prefix("/api/") else {
            return Self::Unknown;
        };

        match path.split('/').next().unwrap_or_default() {
            "support" => Self::Support,
            "embeddings" => Self::Embeddings,
            "knowledge" => Self::Knowledge,
            "files" => Self::Files,
            "structured" => Self::Structured,
            "images" => Self::Images,
            "video" => Self::Video,
            "realtime" => Self::Realtime,
            "connectors" | "mcp" => Self::Connectors,
            "openapi.json" | "scalar" => Self::Documentation,
            _ => Self::Unknown,
        }
    }

    /// Returns the string representation for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Embeddings => "embeddings",
            Self::Knowledge => "knowledge",
            Self::Files => "files",
            Self::Structured => "structured",
            Self::Images => "images",
            Self::Video => "video",
            Self::Realtime => "realtime",
            Self::Connectors => "connectors",
            Self::Documentation => "documentation",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(path: &str) -> RouteCategory {
        RouteCategory::from_uri(&path.parse().unwrap())
    }

    #[test]
    fn categorization_maps_paths_correctly() {
        assert_eq!(category("/api/support/chat"), RouteCategory::Support);
        assert_eq!(category("/api/embeddings/search"), RouteCategory::Embeddings);
        assert_eq!(
            category("/api/embeddings/corpora/faq"),
            RouteCategory::Embeddings
        );
        assert_eq!(category("/api/knowledge/ask"), RouteCategory::Knowledge);
        assert_eq!(category("/api/structured/run"), RouteCategory::Structured);
        assert_eq!(category("/api/realtime/token"), RouteCategory::Realtime);
        assert_eq!(category("/api/files/upload"), RouteCategory::Files);
        assert_eq!(category("/api/images/generate"), RouteCategory::Images);
        assert_eq!(
            category("/api/video/jobs/video_1/content"),
            RouteCategory::Video
        );
        assert_eq!(category("/api/realtime/transcribe"), RouteCategory::Realtime);
        assert_eq!(category("/api/connectors/ping"), RouteCategory::Connectors);
        assert_eq!(category("/api/mcp/chat"), RouteCategory::Connectors);
        assert_eq!(category("/api/scalar"), RouteCategory::Documentation);
        assert_eq!(category("/api/unknown"), RouteCategory::Unknown);
        assert_eq!(category("/support/chat"), RouteCategory::Unknown);
    }
}
