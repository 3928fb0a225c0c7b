//! The request context a targeting decision is made for.

/// Customer and marketplace for a single selection request.
///
/// Built once per request and only read afterwards. Validation of the
/// fields (e.g. a non-empty marketplace) happens at the caller boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestContext {
    customer_id: String,
    marketplace_id: String,
}

impl RequestContext {
    pub fn new(customer_id: impl Into<String>, marketplace_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            marketplace_id: marketplace_id.into(),
        }
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn marketplace_id(&self) -> &str {
        &self.marketplace_id
    }
}
