mod users;

pub use users::UsersPage;

use crate::components::ui::{
    Alert, AlertDescription, Button, Card, CardContent, CardDescription, CardFooter, CardHeader,
    CardTitle, Input, Label, Spinner,
};
use crate::session::{gate, GateDecision};
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_navigate;

pub(crate) const LOGIN_ROUTE: &str = "/login";
pub(crate) const USERS_ROUTE: &str = "/users";

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = StoredValue::new(expect_context::<AppContext>().0);
    let navigate = StoredValue::new(use_navigate());

    // Already holding a token: skip the form. Untracked, runs once on mount.
    Effect::new(move |_| {
        let signed_in =
            app_state.with_value(|s| gate(s.credentials.as_ref()) == GateDecision::Allow);
        if signed_in {
            navigate.with_value(|nav| nav(USERS_ROUTE, Default::default()));
        }
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        let state = app_state.get_value();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match state.log_in(&state.api_client, &email_val, &password_val).await {
                Ok(()) => {
                    loading.set(false);
                    navigate.with_value(|nav| nav(USERS_ROUTE, Default::default()));
                }
                Err(e) => {
                    // The store is untouched, so the gate keeps redirecting here.
                    error.set(Some(e.user_message().to_string()));
                    loading.set(false);
                }
            }
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Sign in"</CardTitle>
                        <CardDescription class="text-xs">"Sign in to manage users."</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="eve.holt@reqres.in"
                                    bind_value=email
                                    required=true
                                    autofocus=true
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| view! {
                                        <Alert class="border-destructive bg-destructive/5">
                                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                        </Alert>
                                    })
                                }}
                            </Show>

                            <Button class="w-full" attr:disabled=move || loading.get()>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>

                    <CardFooter>
                        <div class="text-xs text-muted-foreground">
                            "Access is limited to administrators."
                        </div>
                    </CardFooter>
                </Card>
            </div>
        </div>
    }
}

/// Renders `children` only while a credential is stored; otherwise redirects to login.
///
/// The check reads the store on every render and re-runs on sign-in/sign-out.
/// When redirected, the children are never built, so no list request is made.
#[component]
pub fn RequireSession(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let is_authenticated = move || app_state.gate() == GateDecision::Allow;

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=|| view! { <Redirect path=LOGIN_ROUTE /> }>
            {move || children.with_value(|c| c())}
        </Show>
    }
}
