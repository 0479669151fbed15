//! In-memory `UsersApi` shared by the state tests.

use crate::api::{ApiError, ApiResult, RequestFailure, UsersApi};
use crate::models::{User, UserDraft, UserPage, UserPatch};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::BTreeMap;

pub(crate) fn user(id: u64) -> User {
    User {
        id,
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        email: format!("user{id}@reqres.in"),
        avatar: format!("https://reqres.in/img/faces/{id}-image.jpg"),
    }
}

fn server_error() -> RequestFailure {
    RequestFailure::Status {
        status: 500,
        body: "boom".to_string(),
    }
}

/// Paged users held in memory; records every call it receives.
pub(crate) struct FakeUsersApi {
    pub pages: BTreeMap<u32, Vec<u64>>,
    /// Token handed out by `authenticate`; `None` rejects every login.
    pub token: Option<String>,
    pub fail_lists: bool,
    pub fail_mutations: bool,
    calls: RefCell<Vec<String>>,
}

impl FakeUsersApi {
    pub fn three_pages() -> Self {
        let mut pages = BTreeMap::new();
        pages.insert(1, vec![1, 2]);
        pages.insert(2, vec![4, 5, 6]);
        pages.insert(3, vec![7]);
        Self {
            pages,
            token: None,
            fail_lists: false,
            fail_mutations: false,
            calls: RefCell::new(vec![]),
        }
    }

    pub fn accepting_login(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..Self::three_pages()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl UsersApi for FakeUsersApi {
    async fn authenticate(&self, email: &str, _password: &str) -> ApiResult<String> {
        self.calls.borrow_mut().push(format!("authenticate {email}"));
        self.token.clone().ok_or_else(|| {
            ApiError::Auth(RequestFailure::Status {
                status: 400,
                body: "{\"error\":\"user not found\"}".to_string(),
            })
        })
    }

    async fn list_page(&self, page: u32) -> ApiResult<UserPage> {
        self.calls.borrow_mut().push(format!("list {page}"));
        if self.fail_lists {
            return Err(ApiError::Fetch(server_error()));
        }
        let ids = self.pages.get(&page).cloned().unwrap_or_default();
        Ok(UserPage {
            users: ids.into_iter().map(user).collect(),
            total_pages: self.pages.len() as u32,
        })
    }

    async fn update_user(&self, id: u64, draft: &UserDraft) -> ApiResult<UserPatch> {
        self.calls.borrow_mut().push(format!("update {id}"));
        if self.fail_mutations {
            return Err(ApiError::Update(server_error()));
        }
        Ok(UserPatch {
            first_name: Some(draft.first_name.clone()),
            last_name: Some(draft.last_name.clone()),
            email: Some(draft.email.clone()),
        })
    }

    async fn delete_user(&self, id: u64) -> ApiResult<()> {
        self.calls.borrow_mut().push(format!("delete {id}"));
        if self.fail_mutations {
            return Err(ApiError::Delete(server_error()));
        }
        Ok(())
    }
}
