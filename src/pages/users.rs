use crate::api::{ApiError, UsersApi};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, Input, Label, Spinner,
};
use crate::models::{User, UserDraft};
use crate::state::{AppContext, BannerTimer, FetchOutcome, FetchTicket, UserListState, BANNER_TTL};
use icons::{ChevronLeft, ChevronRight, CircleAlert, CircleCheck, LogOut, Pencil, Trash2, Users, X};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;

const DELETE_PROMPT: &str = "Are you sure you want to delete this user?";

fn confirm_delete() -> bool {
    window().confirm_with_message(DELETE_PROMPT).unwrap_or(false)
}

fn is_unauthorized<T>(result: &Result<T, ApiError>) -> bool {
    result.as_ref().err().is_some_and(ApiError::is_unauthorized)
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let app_state = StoredValue::new(expect_context::<AppContext>().0);
    let list: RwSignal<UserListState> = RwSignal::new(UserListState::new());
    let timer = BannerTimer::new();

    // Re-render the dialog only when the edit target itself changes.
    let editing = Memo::new(move |_| list.with(|s| s.editing.clone()));
    let mutation_pending = Memo::new(move |_| list.with(|s| s.mutation_pending));

    let arm_banner = move |banner| {
        timer.arm(BANNER_TTL, move || {
            list.update(|s| {
                s.expire_banner(banner);
            });
        });
    };

    // A 401 means the stored token was rejected; dropping it lets the gate redirect.
    let end_session = move || {
        tracing::warn!("session rejected by server, signing out");
        app_state.with_value(|s| s.sign_out());
    };

    let load = move |ticket: FetchTicket| {
        let api_client = app_state.with_value(|s| s.api_client.clone());
        spawn_local(async move {
            let result = api_client.list_page(ticket.page).await;
            let unauthorized = is_unauthorized(&result);

            if let Some(FetchOutcome::Failed(banner)) =
                list.try_update(|s| s.finish_fetch(ticket, result))
            {
                arm_banner(banner);
            }
            if unauthorized {
                end_session();
            }
        });
    };

    // Initial load; skipped when the token vanished before mount.
    Effect::new(move |_| {
        let ticket = list
            .try_update(|s| app_state.with_value(|a| a.begin_list_fetch(s)))
            .flatten();
        if let Some(ticket) = ticket {
            load(ticket);
        }
    });

    let on_previous = move |_| {
        if let Some(Some(ticket)) = list.try_update(|s| s.previous_page()) {
            load(ticket);
        }
    };

    let on_next = move |_| {
        if let Some(Some(ticket)) = list.try_update(|s| s.next_page()) {
            load(ticket);
        }
    };

    let on_delete = Callback::new(move |id: u64| {
        if !confirm_delete() {
            return;
        }
        if list.try_update(|s| s.begin_delete(id)) != Some(true) {
            return;
        }

        let api_client = app_state.with_value(|s| s.api_client.clone());
        spawn_local(async move {
            let result = api_client.delete_user(id).await;
            let unauthorized = is_unauthorized(&result);

            if let Some(banner) = list.try_update(|s| s.finish_delete(id, result)) {
                arm_banner(banner);
            }
            if unauthorized {
                end_session();
            }
        });
    });

    let on_edit = Callback::new(move |user: User| list.update(|s| s.open_edit(user)));
    let on_cancel_edit = Callback::new(move |_: ()| list.update(|s| s.cancel_edit()));

    let on_update = Callback::new(move |draft: UserDraft| {
        let Some(Some(id)) = list.try_update(|s| s.begin_update()) else {
            return;
        };

        let api_client = app_state.with_value(|s| s.api_client.clone());
        spawn_local(async move {
            let result = api_client.update_user(id, &draft).await;
            let unauthorized = is_unauthorized(&result);

            if let Some(banner) = list.try_update(|s| s.finish_update(id, result)) {
                arm_banner(banner);
            }
            if unauthorized {
                end_session();
            }
        });
    });

    let on_sign_out = move |_| {
        timer.cancel();
        app_state.with_value(|s| s.sign_out());
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[1080px] px-2 py-4 sm:px-4 sm:py-8">
                <div class="mb-4 flex flex-col items-start justify-between gap-4 sm:mb-8 sm:flex-row sm:items-center">
                    <h1 class="text-2xl font-bold sm:text-3xl">"Users Management"</h1>

                    <div class="flex items-center gap-3 text-muted-foreground">
                        <Users class="size-5 sm:size-6" />
                        <span class="text-sm">
                            {move || format!("Total Users: {}", list.with(|s| s.users.len()))}
                        </span>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_sign_out>
                            <LogOut />
                            "Sign out"
                        </Button>
                    </div>
                </div>

                <Show when=move || list.with(|s| s.error.is_some()) fallback=|| ().into_view()>
                    {move || list.with(|s| s.error.clone()).map(|e| view! {
                        <Alert class="mb-4 border-destructive bg-destructive/5 text-destructive sm:mb-6">
                            <CircleAlert />
                            <AlertDescription>{e}</AlertDescription>
                        </Alert>
                    })}
                </Show>

                <Show when=move || list.with(|s| s.success.is_some()) fallback=|| ().into_view()>
                    {move || list.with(|s| s.success.clone()).map(|msg| view! {
                        <Alert class="mb-4 border-green-500 bg-green-50 text-green-700 sm:mb-6">
                            <CircleCheck />
                            <AlertDescription>{msg}</AlertDescription>
                        </Alert>
                    })}
                </Show>

                <Card class="overflow-hidden py-0">
                    <div class="overflow-x-auto">
                        <table class="min-w-full divide-y divide-border">
                            <thead class="bg-muted/50">
                                <tr>
                                    <th scope="col" class="px-3 py-3 text-left text-xs font-medium uppercase tracking-wider text-muted-foreground sm:px-6">"Avatar"</th>
                                    <th scope="col" class="px-3 py-3 text-left text-xs font-medium uppercase tracking-wider text-muted-foreground sm:px-6">"Name"</th>
                                    <th scope="col" class="hidden px-3 py-3 text-left text-xs font-medium uppercase tracking-wider text-muted-foreground sm:table-cell sm:px-6">"Email"</th>
                                    <th scope="col" class="px-3 py-3 text-right text-xs font-medium uppercase tracking-wider text-muted-foreground sm:px-6">"Actions"</th>
                                </tr>
                            </thead>
                            <tbody class="divide-y divide-border">
                                {move || {
                                    let (loading, users) = list.with(|s| (s.is_loading(), s.users.clone()));
                                    if loading {
                                        view! {
                                            <tr>
                                                <td colspan="4" class="px-6 py-12">
                                                    <div class="flex justify-center">
                                                        <Spinner class="size-10 text-primary" />
                                                    </div>
                                                </td>
                                            </tr>
                                        }
                                        .into_any()
                                    } else if users.is_empty() {
                                        view! {
                                            <tr>
                                                <td colspan="4" class="px-6 py-12 text-center text-sm text-muted-foreground">
                                                    "No users found."
                                                </td>
                                            </tr>
                                        }
                                        .into_any()
                                    } else {
                                        users
                                            .into_iter()
                                            .map(|user| view! {
                                                <UserRow
                                                    user=user
                                                    pending=mutation_pending
                                                    on_edit=on_edit
                                                    on_delete=on_delete
                                                />
                                            })
                                            .collect_view()
                                            .into_any()
                                    }
                                }}
                            </tbody>
                        </table>
                    </div>
                </Card>

                <div class="mt-4 flex items-center justify-center gap-3 sm:mt-8 sm:gap-4">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Icon
                        attr:aria-label="Previous page"
                        attr:disabled=move || !list.with(|s| s.can_go_previous())
                        on:click=on_previous
                    >
                        <ChevronLeft class="size-5" />
                    </Button>
                    <span class="text-sm text-muted-foreground">
                        {move || list.with(|s| format!("Page {} of {}", s.page, s.total_pages))}
                    </span>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Icon
                        attr:aria-label="Next page"
                        attr:disabled=move || !list.with(|s| s.can_go_next())
                        on:click=on_next
                    >
                        <ChevronRight class="size-5" />
                    </Button>
                </div>

                {move || editing.get().map(|user| view! {
                    <EditUserDialog
                        user=user
                        pending=mutation_pending
                        on_submit=on_update
                        on_cancel=on_cancel_edit
                    />
                })}
            </div>
        </div>
    }
}

#[component]
fn UserRow(
    user: User,
    #[prop(into)] pending: Signal<bool>,
    on_edit: Callback<User>,
    on_delete: Callback<u64>,
) -> impl IntoView {
    let id = user.id;
    let name = user.full_name();
    let edit_target = user.clone();

    view! {
        <tr class="transition-colors hover:bg-muted/40">
            <td class="whitespace-nowrap px-3 py-3 sm:px-6">
                <img
                    src=user.avatar.clone()
                    alt=name.clone()
                    class="size-8 rounded-full border-2 border-border object-cover sm:size-10"
                />
            </td>
            <td class="whitespace-nowrap px-3 py-3 sm:px-6">
                <div class="text-sm font-medium">{name}</div>
                <div class="text-xs text-muted-foreground sm:hidden">{user.email.clone()}</div>
            </td>
            <td class="hidden whitespace-nowrap px-3 py-3 text-sm text-muted-foreground sm:table-cell sm:px-6">
                {user.email.clone()}
            </td>
            <td class="whitespace-nowrap px-3 py-3 text-right sm:px-6">
                <div class="flex items-center justify-end gap-1 sm:gap-2">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Icon
                        class="text-primary"
                        attr:title="Edit user"
                        on:click=move |_| on_edit.run(edit_target.clone())
                    >
                        <Pencil />
                    </Button>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Icon
                        class="text-destructive"
                        attr:title="Delete user"
                        attr:disabled=move || pending.get()
                        on:click=move |_| on_delete.run(id)
                    >
                        <Trash2 />
                    </Button>
                </div>
            </td>
        </tr>
    }
}

/// Modal form over the three editable fields, seeded once from `user`.
#[component]
fn EditUserDialog(
    user: User,
    #[prop(into)] pending: Signal<bool>,
    on_submit: Callback<UserDraft>,
    on_cancel: Callback<()>,
) -> impl IntoView {
    let seed = UserDraft::from_user(&user);
    let first_name: RwSignal<String> = RwSignal::new(seed.first_name);
    let last_name: RwSignal<String> = RwSignal::new(seed.last_name);
    let email: RwSignal<String> = RwSignal::new(seed.email);
    let form_error: RwSignal<Option<String>> = RwSignal::new(None);

    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" {
            on_cancel.run(());
        }
    });
    on_cleanup(move || key_handle.remove());

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }

        let draft = UserDraft {
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
            email: email.get_untracked(),
        };
        if let Some(field) = draft.missing_fields().first() {
            form_error.set(Some(format!("{field} is required")));
            return;
        }

        form_error.set(None);
        on_submit.run(draft);
    };

    view! {
        <div class="fixed inset-0 z-50 flex items-start justify-center overflow-y-auto bg-black/40 px-4 pt-4 sm:pt-20">
            <div class="relative w-full max-w-sm rounded-xl border border-border bg-background p-4 shadow-lg sm:p-5">
                <div class="mb-4 flex items-center justify-between sm:mb-6">
                    <h3 class="text-lg font-semibold sm:text-xl">"Edit User"</h3>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Icon
                        attr:aria-label="Close"
                        on:click=move |_| on_cancel.run(())
                    >
                        <X />
                    </Button>
                </div>

                <form class="flex flex-col gap-3 sm:gap-4" on:submit=submit>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="edit_first_name">"First Name"</Label>
                        <Input id="edit_first_name" bind_value=first_name required=true />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="edit_last_name">"Last Name"</Label>
                        <Input id="edit_last_name" bind_value=last_name required=true />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="edit_email">"Email"</Label>
                        <Input id="edit_email" r#type="email" bind_value=email required=true />
                    </div>

                    <Show when=move || form_error.get().is_some() fallback=|| ().into_view()>
                        {move || form_error.get().map(|e| view! {
                            <Alert class="border-destructive bg-destructive/5">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        })}
                    </Show>

                    <div class="mt-2 flex justify-end gap-3">
                        <Button
                            variant=ButtonVariant::Secondary
                            attr:r#type="button"
                            on:click=move |_| on_cancel.run(())
                        >
                            "Cancel"
                        </Button>
                        <Button attr:disabled=move || pending.get()>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || pending.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if pending.get() { "Updating..." } else { "Update" }}
                            </span>
                        </Button>
                    </div>
                </form>
            </div>
        </div>
    }
}
