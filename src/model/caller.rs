use rocket::{
    http::Status,
    request::{FromRequest, Outcome, Request},
    serde::json::serde_json,
};
use serde::{Deserialize, Serialize};

/// Badge categories that make their holder "trusted".
pub const TRUSTED_BADGE_CATEGORIES: [&str; 3] = ["participation", "community", "activity"];

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_BADGES_HEADER: &str = "x-user-badges";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadge {
    pub id: String,
    pub category: String,
    pub name: String,
}

/// Does any of the badges belong to a trusted category?
pub fn has_trusted_badge(badges: &[UserBadge]) -> bool {
    badges.iter().any(|badge| {
        let category = badge.category.to_lowercase();
        TRUSTED_BADGE_CATEGORIES.contains(&category.as_str())
    })
}

/// Who the request claims to come from.
///
/// This is self-declared identity taken from headers, not authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: String,
    pub user_name: String,
    pub badges: Vec<UserBadge>,
}

impl Default for CallerContext {
    fn default() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            user_name: "Unknown".to_string(),
            badges: Vec::new(),
        }
    }
}

impl CallerContext {
    pub fn is_trusted(&self) -> bool {
        has_trusted_badge(&self.badges)
    }

    pub fn is_representative(&self) -> bool {
        self.badges.iter().any(|badge| {
            badge.id == "representative" || badge.name.to_lowercase().contains("képviselő")
        })
    }
}

/// The reason a request guard refused a request, for the catchers to report.
#[derive(Debug, Clone, Default)]
pub struct GuardFailure(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CallerContext {
    type Error = String;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = req.headers();
        let mut caller = CallerContext::default();

        if let Some(user_id) = headers.get_one(USER_ID_HEADER).filter(|s| !s.is_empty()) {
            caller.user_id = user_id.to_string();
        }
        if let Some(user_name) = headers.get_one(USER_NAME_HEADER).filter(|s| !s.is_empty()) {
            caller.user_name = user_name.to_string();
        }
        if let Some(badges) = headers.get_one(USER_BADGES_HEADER).filter(|s| !s.is_empty()) {
            match serde_json::from_str(badges) {
                Ok(badges) => caller.badges = badges,
                Err(e) => {
                    let msg = format!("Malformed {USER_BADGES_HEADER} header: {e}");
                    req.local_cache(|| GuardFailure(Some(msg.clone())));
                    return Outcome::Error((Status::BadRequest, msg));
                }
            }
        }

        Outcome::Success(caller)
    }
}

#[cfg(test)]
impl CallerContext {
    pub fn example_member() -> Self {
        Self {
            user_id: "user-new".to_string(),
            user_name: "Új Tag".to_string(),
            badges: vec![],
        }
    }

    pub fn example_trusted() -> Self {
        Self {
            user_id: "user-trusted".to_string(),
            user_name: "Bizalmi Tag".to_string(),
            badges: vec![UserBadge {
                id: "active-1".to_string(),
                category: "Participation".to_string(),
                name: "Aktív résztvevő".to_string(),
            }],
        }
    }

    pub fn example_representative() -> Self {
        Self {
            user_id: "rep-1".to_string(),
            user_name: "Kovács János".to_string(),
            badges: vec![UserBadge {
                id: "rep-badge".to_string(),
                category: "role".to_string(),
                name: "Országgyűlési Képviselő".to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_is_case_insensitive() {
        assert!(CallerContext::example_trusted().is_trusted());
        assert!(!CallerContext::example_member().is_trusted());
        assert!(!CallerContext::example_representative().is_trusted());
    }

    #[test]
    fn representative_by_id_or_name() {
        assert!(CallerContext::example_representative().is_representative());
        let by_id = CallerContext {
            badges: vec![UserBadge {
                id: "representative".to_string(),
                category: "role".to_string(),
                name: "Rep".to_string(),
            }],
            ..CallerContext::default()
        };
        assert!(by_id.is_representative());
        assert!(!CallerContext::example_trusted().is_representative());
    }
}
