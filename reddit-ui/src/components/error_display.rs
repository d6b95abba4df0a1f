use leptos::prelude::*;

#[component]
pub fn ErrorDisplay(
    #[prop(into)] message: String,
    #[prop(optional)] on_dismiss: Option<Callback<()>>,
) -> impl IntoView {
    view! {
        <div class="error" role="alert">
            <p class="error__message">{message}</p>
            {move || on_dismiss.map(|dismiss| view! {
                <button
                    class="error__dismiss"
                    on:click=move |_| dismiss.run(())
                >
                    "Dismiss"
                </button>
            })}
        </div>
    }
}
