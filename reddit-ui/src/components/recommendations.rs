use crate::api::UiController;
use leptos::prelude::*;

/// Sidebar list of the largest communities, loaded once on mount.
#[component]
pub fn Recommendations() -> impl IntoView {
    let fetcher = expect_context::<UiController>().recommendations();
    let communities = LocalResource::new(move || {
        let fetcher = fetcher.clone();
        async move { fetcher.fetch().await }
    });

    view! {
        <div class="recommendations">
            <h2 class="recommendations__title">"Top Communities"</h2>
            {move || match communities.get() {
                None => view! {
                    <p class="recommendations__loading">"Loading..."</p>
                }.into_any(),
                Some(list) if list.is_empty() => view! {
                    <p class="recommendations__empty">"No communities yet."</p>
                }.into_any(),
                Some(list) => view! {
                    <ol class="recommendations__list">
                        {list.into_iter().map(|community| {
                            let href = format!("/r/{}", community.id);
                            view! {
                                <li class="recommendations__item">
                                    {community.image_url.map(|src| view! {
                                        <img class="recommendations__icon" src=src alt=""/>
                                    })}
                                    <a href=href class="recommendations__name">
                                        "r/" {community.id}
                                    </a>
                                    <span class="recommendations__members">
                                        {community.number_of_members} " members"
                                    </span>
                                </li>
                            }
                        }).collect_view()}
                    </ol>
                }.into_any(),
            }}
        </div>
    }
}
