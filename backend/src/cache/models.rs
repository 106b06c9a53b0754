use shared::AnalysisResponse;

#[derive(Debug, Clone)]
pub struct CachedAnalysis {
    pub response: AnalysisResponse,
    pub access_count: u32,
}

impl CachedAnalysis {
    pub fn new(response: AnalysisResponse) -> Self {
        Self {
            response,
            access_count: 0,
        }
    }

    pub fn touch(&mut self) {
        self.access_count += 1;
    }

    /// The stored response, marked as served from cache.
    pub fn to_cached_response(&self) -> AnalysisResponse {
        AnalysisResponse {
            cached: true,
            ..self.response.clone()
        }
    }
}
