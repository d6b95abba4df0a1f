use leptos::prelude::*;

/// Placeholder cards shown while the feed loads.
#[component]
pub fn PostLoader() -> impl IntoView {
    view! {
        <div class="post-loader">
            {(0..2).map(|_| view! {
                <div class="post-loader__card">
                    <div class="post-loader__line post-loader__line--short"></div>
                    <div class="post-loader__line"></div>
                    <div class="post-loader__block"></div>
                </div>
            }).collect_view()}
        </div>
    }
}
