use crate::api::ApiResult;
use crate::models::{User, UserPage, UserPatch};
use std::time::Duration;

/// How long a success/error banner stays up.
pub(crate) const BANNER_TTL: Duration = Duration::from_secs(3);

pub(crate) const DELETE_SUCCESS: &str = "User deleted successfully";
pub(crate) const UPDATE_SUCCESS: &str = "User updated successfully";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ListStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Handle for one list request. Only the most recent ticket may apply its response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FetchTicket {
    pub seq: u64,
    pub page: u32,
}

/// Handle for one banner message; expiring an outdated one is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Banner {
    pub seq: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    Applied,
    Failed(Banner),
    /// A newer request was issued after this one; the response was dropped.
    Stale,
}

/// In-memory page of users plus the transient UI state around it.
///
/// Framework-free: the page component keeps this in a signal and feeds it
/// network results. Failure convention: prior good state is always kept
/// (users on a failed fetch, the open edit target on a failed update).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UserListState {
    pub users: Vec<User>,
    pub page: u32,
    pub total_pages: u32,
    pub status: ListStatus,
    pub error: Option<String>,
    pub success: Option<String>,
    pub editing: Option<User>,
    /// A delete or update is awaiting the server.
    pub mutation_pending: bool,

    request_seq: u64,
    banner_seq: u64,
}

impl Default for UserListState {
    fn default() -> Self {
        Self::new()
    }
}

impl UserListState {
    pub fn new() -> Self {
        Self {
            users: vec![],
            page: 1,
            total_pages: 1,
            status: ListStatus::Idle,
            error: None,
            success: None,
            editing: None,
            mutation_pending: false,
            request_seq: 0,
            banner_seq: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListStatus::Loading
    }

    pub fn can_go_previous(&self) -> bool {
        self.page > 1 && !self.is_loading()
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages && !self.is_loading()
    }

    /// Marks the current page as loading and issues a ticket for it.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.request_seq = self.request_seq.saturating_add(1);
        self.status = ListStatus::Loading;
        FetchTicket {
            seq: self.request_seq,
            page: self.page,
        }
    }

    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: ApiResult<UserPage>) -> FetchOutcome {
        if ticket.seq != self.request_seq {
            tracing::debug!(
                stale = ticket.seq,
                current = self.request_seq,
                "dropping stale page response"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                self.users = page.users;
                self.total_pages = page.total_pages.max(1);
                self.page = self.page.clamp(1, self.total_pages);
                self.status = ListStatus::Loaded;
                FetchOutcome::Applied
            }
            Err(e) => {
                self.status = ListStatus::Error;
                FetchOutcome::Failed(self.show_error(e.user_message()))
            }
        }
    }

    pub fn previous_page(&mut self) -> Option<FetchTicket> {
        if !self.can_go_previous() {
            return None;
        }
        self.page = self.page.saturating_sub(1).max(1);
        Some(self.begin_fetch())
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        if !self.can_go_next() {
            return None;
        }
        self.page = self.page.saturating_add(1).min(self.total_pages);
        Some(self.begin_fetch())
    }

    /// Claims the mutation slot for deleting `id`. Returns false when another
    /// mutation is in flight.
    pub fn begin_delete(&mut self, id: u64) -> bool {
        if self.mutation_pending {
            return false;
        }
        tracing::debug!(id, "deleting user");
        self.mutation_pending = true;
        true
    }

    pub fn finish_delete(&mut self, id: u64, result: ApiResult<()>) -> Banner {
        self.mutation_pending = false;
        match result {
            Ok(()) => {
                if let Some(pos) = self.users.iter().position(|u| u.id == id) {
                    self.users.remove(pos);
                }
                self.show_success(DELETE_SUCCESS)
            }
            Err(e) => self.show_error(e.user_message()),
        }
    }

    pub fn open_edit(&mut self, user: User) {
        self.editing = Some(user);
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Claims the mutation slot for the open edit target and returns its id.
    pub fn begin_update(&mut self) -> Option<u64> {
        if self.mutation_pending {
            return None;
        }
        let id = self.editing.as_ref()?.id;
        self.mutation_pending = true;
        Some(id)
    }

    pub fn finish_update(&mut self, id: u64, result: ApiResult<UserPatch>) -> Banner {
        self.mutation_pending = false;
        match result {
            Ok(patch) => {
                if let Some(user) = self.users.iter_mut().find(|u| u.id == id) {
                    user.merge(&patch);
                }
                if self.editing.as_ref().map(|u| u.id) == Some(id) {
                    self.editing = None;
                }
                self.show_success(UPDATE_SUCCESS)
            }
            // Dialog stays open so the draft can be resubmitted.
            Err(e) => self.show_error(e.user_message()),
        }
    }

    /// Shows a success banner, replacing whatever banner was up.
    pub fn show_success(&mut self, message: &str) -> Banner {
        self.error = None;
        self.success = Some(message.to_string());
        self.next_banner()
    }

    /// Shows an error banner, replacing whatever banner was up.
    pub fn show_error(&mut self, message: &str) -> Banner {
        self.success = None;
        self.error = Some(message.to_string());
        self.next_banner()
    }

    /// Clears the banner if `banner` is still the one on screen.
    pub fn expire_banner(&mut self, banner: Banner) -> bool {
        if banner.seq != self.banner_seq {
            return false;
        }
        self.success = None;
        self.error = None;
        true
    }

    fn next_banner(&mut self) -> Banner {
        self.banner_seq = self.banner_seq.saturating_add(1);
        Banner {
            seq: self.banner_seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UsersApi;
    use crate::models::UserDraft;
    use crate::state::testing::{user, FakeUsersApi};
    use futures::executor::block_on;
    use rstest::rstest;

    fn fetch(state: &mut UserListState, api: &FakeUsersApi, ticket: FetchTicket) -> FetchOutcome {
        let result = block_on(api.list_page(ticket.page));
        state.finish_fetch(ticket, result)
    }

    fn mounted(api: &FakeUsersApi) -> UserListState {
        let mut state = UserListState::new();
        let ticket = state.begin_fetch();
        assert_eq!(fetch(&mut state, api, ticket), FetchOutcome::Applied);
        state
    }

    fn ids(state: &UserListState) -> Vec<u64> {
        state.users.iter().map(|u| u.id).collect()
    }

    #[test]
    fn test_new_state_starts_on_page_one() {
        let state = UserListState::new();
        assert_eq!(state.page, 1);
        assert_eq!(state.total_pages, 1);
        assert_eq!(state.status, ListStatus::Idle);
        assert!(state.users.is_empty());
    }

    #[test]
    fn test_mount_fetch_loads_first_page() {
        let api = FakeUsersApi::three_pages();
        let mut state = UserListState::new();
        let ticket = state.begin_fetch();
        assert!(state.is_loading());
        assert_eq!(ticket.page, 1);

        assert_eq!(fetch(&mut state, &api, ticket), FetchOutcome::Applied);
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.total_pages, 3);
        assert_eq!(state.status, ListStatus::Loaded);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_navigating_away_and_back_restores_items() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        let first = state.users.clone();

        let ticket = state.next_page().expect("page 2 reachable");
        fetch(&mut state, &api, ticket);
        assert_ne!(state.users, first);

        let ticket = state.previous_page().expect("page 1 reachable");
        fetch(&mut state, &api, ticket);
        assert_eq!(state.users, first);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_previous_on_first_page_is_noop() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        let before = state.clone();

        assert!(!state.can_go_previous());
        assert!(state.previous_page().is_none());
        assert_eq!(state, before);
        assert_eq!(api.calls(), vec!["list 1"]);
    }

    #[test]
    fn test_next_on_last_page_is_noop() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        for _ in 0..2 {
            let ticket = state.next_page().expect("next page reachable");
            fetch(&mut state, &api, ticket);
        }
        assert_eq!(state.page, 3);
        let before = state.clone();

        assert!(!state.can_go_next());
        assert!(state.next_page().is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_navigation_blocked_while_loading() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        state.next_page().expect("page 2 reachable");

        assert!(state.next_page().is_none());
        assert!(state.previous_page().is_none());
        assert_eq!(state.page, 2);
    }

    #[rstest]
    #[case(1, false, false)]
    #[case(3, false, false)]
    #[case(3, true, true)]
    fn test_single_page_and_bounds(#[case] total: u32, #[case] at_last: bool, #[case] can_prev: bool) {
        let mut state = UserListState::new();
        let ticket = state.begin_fetch();
        state.finish_fetch(
            ticket,
            Ok(UserPage {
                users: vec![user(1)],
                total_pages: total,
            }),
        );
        if at_last {
            state.page = total;
        }
        assert_eq!(state.can_go_previous(), can_prev);
        assert_eq!(state.can_go_next(), state.page < total);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);

        let to_page_two = state.next_page().expect("page 2 reachable");
        // Simulate the user jumping again before page 2 answers.
        state.status = ListStatus::Loaded;
        let to_page_three = state.next_page().expect("page 3 reachable");

        assert_eq!(fetch(&mut state, &api, to_page_three), FetchOutcome::Applied);
        assert_eq!(ids(&state), vec![7]);

        assert_eq!(fetch(&mut state, &api, to_page_two), FetchOutcome::Stale);
        assert_eq!(ids(&state), vec![7]);
        assert_eq!(state.page, 3);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_users() {
        let mut api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);

        api.fail_lists = true;
        let ticket = state.next_page().expect("page 2 reachable");
        let outcome = fetch(&mut state, &api, ticket);

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert_eq!(state.status, ListStatus::Error);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch users"));
        assert_eq!(ids(&state), vec![1, 2]);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_short_response_clamps_page_number() {
        let mut state = UserListState::new();
        state.total_pages = 5;
        state.page = 4;
        let ticket = state.begin_fetch();
        state.finish_fetch(
            ticket,
            Ok(UserPage {
                users: vec![],
                total_pages: 2,
            }),
        );
        assert_eq!(state.page, 2);
    }

    #[test]
    fn test_delete_removes_exactly_one_and_keeps_order() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        let ticket = state.next_page().expect("page 2 reachable");
        fetch(&mut state, &api, ticket);

        assert!(state.begin_delete(5));
        let result = block_on(api.delete_user(5));
        state.finish_delete(5, result);

        assert_eq!(ids(&state), vec![4, 6]);
        assert!(!state.mutation_pending);
    }

    #[test]
    fn test_delete_failure_leaves_users() {
        let mut api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        api.fail_mutations = true;

        assert!(state.begin_delete(1));
        let result = block_on(api.delete_user(1));
        state.finish_delete(1, result);

        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.error.as_deref(), Some("Failed to delete user"));
        assert!(state.success.is_none());
    }

    #[test]
    fn test_second_mutation_rejected_while_pending() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        state.open_edit(user(1));

        assert!(state.begin_delete(2));
        assert!(!state.begin_delete(1));
        assert!(state.begin_update().is_none());
    }

    #[test]
    fn test_update_replaces_three_fields_only() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        let original = state.users[1].clone();
        state.open_edit(original.clone());

        let id = state.begin_update().expect("edit target open");
        let draft = UserDraft {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "c@d.com".to_string(),
        };
        let result = block_on(api.update_user(id, &draft));
        state.finish_update(id, result);

        let updated = &state.users[1];
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.avatar, original.avatar);
        assert_eq!(updated.first_name, "A");
        assert_eq!(updated.last_name, "B");
        assert_eq!(updated.email, "c@d.com");
        assert_eq!(state.users[0], user(1));
        assert!(state.editing.is_none());
        assert_eq!(state.success.as_deref(), Some(UPDATE_SUCCESS));
    }

    #[test]
    fn test_partial_patch_keeps_local_values() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        state.open_edit(user(2));
        let id = state.begin_update().expect("edit target open");

        state.finish_update(
            id,
            Ok(UserPatch {
                first_name: None,
                last_name: None,
                email: Some("new@reqres.in".to_string()),
            }),
        );

        assert_eq!(state.users[1].first_name, "First2");
        assert_eq!(state.users[1].email, "new@reqres.in");
    }

    #[test]
    fn test_failed_update_keeps_dialog_open() {
        let mut api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        api.fail_mutations = true;
        state.open_edit(user(1));

        let id = state.begin_update().expect("edit target open");
        let result = block_on(api.update_user(id, &UserDraft::from_user(&user(1))));
        state.finish_update(id, result);

        assert_eq!(state.editing.as_ref().map(|u| u.id), Some(1));
        assert_eq!(state.error.as_deref(), Some("Failed to update user"));
        assert_eq!(state.users[0], user(1));
    }

    #[test]
    fn test_cancel_edit_makes_no_calls() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        state.open_edit(user(2));
        state.cancel_edit();

        assert!(state.editing.is_none());
        assert!(state.begin_update().is_none());
        assert_eq!(api.calls(), vec!["list 1"]);
    }

    #[test]
    fn test_banner_expiry_only_clears_current_message() {
        let mut state = UserListState::new();
        let old = state.show_error("Failed to delete user");
        let new = state.show_success(DELETE_SUCCESS);

        assert!(state.error.is_none());
        assert!(!state.expire_banner(old));
        assert_eq!(state.success.as_deref(), Some(DELETE_SUCCESS));

        assert!(state.expire_banner(new));
        assert!(state.success.is_none());
    }

    #[test]
    fn test_scenario_next_page_then_delete_then_banner_expires() {
        let api = FakeUsersApi::three_pages();
        let mut state = mounted(&api);
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.total_pages, 3);

        let ticket = state.next_page().expect("page 2 reachable");
        assert_eq!(state.page, 2);
        fetch(&mut state, &api, ticket);

        // User confirmed the prompt.
        assert!(state.begin_delete(5));
        let result = block_on(api.delete_user(5));
        let banner = state.finish_delete(5, result);

        assert!(!ids(&state).contains(&5));
        assert_eq!(state.success.as_deref(), Some("User deleted successfully"));

        // Timer fires after BANNER_TTL.
        assert!(state.expire_banner(banner));
        assert!(state.success.is_none());
        assert_eq!(api.calls(), vec!["list 1", "list 2", "delete 5"]);
    }
}
