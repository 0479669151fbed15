use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "flex w-full items-center gap-3 rounded-r-lg border-l-4 px-4 py-3 text-sm [&>svg]:size-5 [&>svg]:shrink-0"}
    clx! {AlertDescription, p, "text-sm leading-relaxed"}
}

pub use components::*;
