/// Decides whether a zero-result strict search may be retried with
/// relaxed scope.
#[allow(async_fn_in_trait)]
pub trait IRelaxationConsent: Send + Sync {
    async fn consent_to_relax(&self, query_text: &str) -> bool;
}

/// Always consents. Used for non-interactive searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConsent;

impl IRelaxationConsent for AutoConsent {
    async fn consent_to_relax(&self, _query_text: &str) -> bool {
        true
    }
}

/// Never consents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineRelaxation;

impl IRelaxationConsent for DeclineRelaxation {
    async fn consent_to_relax(&self, _query_text: &str) -> bool {
        false
    }
}
