use serde::Deserialize;
use crate::auth::{Role, SignUpMetadata};
use crate::view::{ResultFilter, Selection};

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub department: Option<String>,
    pub role: Option<Role>,
}

impl SignUpRequest {
    pub fn metadata(&self) -> SignUpMetadata {
        SignUpMetadata {
            full_name: self.full_name.clone(),
            department: self.department.clone(),
            role: self.role,
        }
    }
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, Default)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub session: Option<String>,
    pub risk: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    /// Comma-separated record ids; omitted exports every visible record.
    pub ids: Option<String>,
}

impl ExportQuery {
    pub fn filter(&self) -> ResultFilter {
        ResultFilter {
            risk: self.risk.clone(),
            category: self.category.clone(),
            search: self.q.clone(),
        }
    }

    pub fn selection(&self) -> Selection {
        match &self.ids {
            Some(ids) => Selection::from_ids(ids.split(',').map(str::trim)),
            None => Selection::new(),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct CaseHistoryQuery {
    pub tool: Option<String>,
    pub limit: Option<usize>,
}
