//! Endpoint routes and first-page query parameters.

use camara_core::{ApiConfig, VotationWindow};

use crate::source::QueryParams;

/// Builds endpoint URLs below a versioned base URL.
#[derive(Debug, Clone)]
pub struct Routes {
    base_url: String,
}

impl Routes {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn deputies(&self) -> String {
        format!("{}/deputados", self.base_url)
    }

    pub fn deputy_organs(&self, deputy_id: i64) -> String {
        format!("{}/deputados/{deputy_id}/orgaos", self.base_url)
    }

    pub fn parties(&self) -> String {
        format!("{}/partidos", self.base_url)
    }

    pub fn organs(&self) -> String {
        format!("{}/orgaos", self.base_url)
    }

    pub fn votations(&self) -> String {
        format!("{}/votacoes", self.base_url)
    }

    pub fn votation(&self, votation_id: &str) -> String {
        format!("{}/votacoes/{votation_id}", self.base_url)
    }

    pub fn votation_votes(&self, votation_id: &str) -> String {
        format!("{}/votacoes/{votation_id}/votos", self.base_url)
    }
}

/// `itens=<size>` only.
pub fn page_params(page_size: u32) -> QueryParams {
    vec![("itens".to_string(), page_size.to_string())]
}

/// Date-window filter for `/votacoes`, oldest first.
pub fn votation_params(config: &ApiConfig, window: &VotationWindow) -> QueryParams {
    vec![
        ("dataInicio".to_string(), window.start.format("%Y-%m-%d").to_string()),
        ("dataFim".to_string(), window.end.format("%Y-%m-%d").to_string()),
        ("ordem".to_string(), "ASC".to_string()),
        ("ordenarPor".to_string(), "dataHoraRegistro".to_string()),
        ("itens".to_string(), config.page_size.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_trim_trailing_slash() {
        let routes = Routes::new("https://example.org/api/v2/");
        assert_eq!(routes.parties(), "https://example.org/api/v2/partidos");
        assert_eq!(routes.deputy_organs(204554), "https://example.org/api/v2/deputados/204554/orgaos");
        assert_eq!(routes.votation_votes("2-3"), "https://example.org/api/v2/votacoes/2-3/votos");
    }

    #[test]
    fn test_votation_params() {
        let params = votation_params(&ApiConfig::default(), &VotationWindow::default());
        assert_eq!(params[0], ("dataInicio".to_string(), "2025-09-01".to_string()));
        assert_eq!(params[1], ("dataFim".to_string(), "2025-09-30".to_string()));
        assert_eq!(params[4], ("itens".to_string(), "100".to_string()));
    }
}
