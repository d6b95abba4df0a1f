use crate::api::UiController;
use crate::components::PostFeed;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use reddit_app::application::{FeedOutcome, SessionState};

#[component]
pub fn CommunityPage() -> impl IntoView {
    let controller = expect_context::<UiController>();
    let session = expect_context::<RwSignal<SessionState>>();
    let params = use_params_map();
    let community_id = move || params.with(|p| p.get("community_id").unwrap_or_default());

    Effect::new(move |_| {
        let id = community_id();
        let viewer = session.with(|s| s.viewer());
        let controller = controller.clone();
        spawn_local(async move {
            if let FeedOutcome::Applied { .. } = controller.load_community_feed(&id).await {
                controller.annotate_votes(&viewer).await;
            }
        });
    });

    view! {
        <div class="community-header">
            <h1 class="community-header__title">"r/" {community_id}</h1>
        </div>
        <div class="page-content">
            <section class="page-content__main">
                <PostFeed/>
            </section>
        </div>
    }
}
