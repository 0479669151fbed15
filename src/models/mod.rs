use serde::{Deserialize, Serialize};

/// A user record from the remote `/users` collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Overwrites only the fields the server echoed back.
    pub fn merge(&mut self, patch: &UserPatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
    }
}

/// Fields returned by `PUT /users/{id}`. The server also sends `updatedAt`,
/// which is ignored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct UserPatch {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The editable subset of a user; also the `PUT` body.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserDraft {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }

    /// Labels of the fields left blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("First name", &self.first_name),
            ("Last name", &self.last_name),
            ("Email", &self.email),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

/// One server page of users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UserPage {
    pub users: Vec<User>,
    pub total_pages: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct UserListResponse {
    pub data: Vec<User>,
    pub total_pages: u32,
}

impl From<UserListResponse> for UserPage {
    fn from(res: UserListResponse) -> Self {
        Self {
            users: res.data,
            // An empty collection still has one (empty) page.
            total_pages: res.total_pages.max(1),
        }
    }
}
