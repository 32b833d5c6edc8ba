use serde::{Deserialize, Serialize};

/// The `{success, data, message, meta}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: None,
        }
    }

    /// A successful response that carries only a message.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Listing metadata. Which fields are present depends on the route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_is_trusted: Option<bool>,
}

impl Meta {
    pub fn count(count: usize) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    pub fn total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub fn window(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    pub fn user_is_trusted(mut self, trusted: bool) -> Self {
        self.user_is_trusted = Some(trusted);
        self
    }
}

/// The body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_vote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_trust: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_badge: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            existing_vote: None,
            required_trust: None,
            required_badge: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Receipt {
        id: String,
    }

    #[test]
    fn envelope_without_data() {
        let body: ApiResponse<Receipt> =
            serde_json::from_str(r#"{"success": true, "message": "Listing deleted"}"#).unwrap();
        assert!(body.success);
        assert_eq!(body.data, None);
        assert_eq!(body.message.as_deref(), Some("Listing deleted"));

        let body: ApiResponse<Receipt> =
            serde_json::from_str(r#"{"success": true, "data": {"id": "r-1"}, "meta": {"count": 1}}"#)
                .unwrap();
        assert_eq!(body.data.unwrap().id, "r-1");
        assert_eq!(body.meta, Some(Meta::count(1)));
    }
}
