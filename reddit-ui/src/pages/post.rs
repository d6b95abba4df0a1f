use crate::api::UiController;
use crate::components::{use_vote_handler, ErrorDisplay, PostItem, PostLoader};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use reddit_app::application::{PostStore, SessionState};
use reddit_errors::AppError;

#[component]
pub fn PostPage() -> impl IntoView {
    let controller = expect_context::<UiController>();
    let store = expect_context::<RwSignal<PostStore>>();
    let session = expect_context::<RwSignal<SessionState>>();
    let params = use_params_map();
    let post_id = move || params.with(|p| p.get("post_id").unwrap_or_default());

    let loaded = LocalResource::new({
        let controller = controller.clone();
        move || {
            let controller = controller.clone();
            let id = post_id();
            async move { controller.load_post(&id).await }
        }
    });

    Effect::new(move |_| {
        if !matches!(loaded.get(), Some(Ok(_))) {
            return;
        }
        let viewer = session.with(|s| s.viewer());
        let controller = controller.clone();
        spawn_local(async move {
            controller.annotate_votes(&viewer).await;
        });
    });

    let auth_prompt = RwSignal::new(false);
    let on_vote = use_vote_handler(auth_prompt);

    view! {
        <div class="page-content">
            <section class="page-content__main">
                {move || auth_prompt.get().then(|| view! {
                    <ErrorDisplay message=AppError::Unauthenticated.user_message().to_string()/>
                })}
                {move || match loaded.get() {
                    None => view! { <PostLoader/> }.into_any(),
                    Some(Err(e)) => view! {
                        <ErrorDisplay message=e.user_message().to_string()/>
                    }.into_any(),
                    Some(Ok(_)) => {
                        let viewer = session.with(|s| s.viewer());
                        store.with(|s| {
                            s.selected_post().cloned().map(|post| {
                                let user_vote = s.user_vote(&post.id);
                                let user_is_creator = viewer.is_creator_of(&post.creator_id);
                                view! {
                                    <PostItem
                                        post=post
                                        user_vote=user_vote
                                        user_is_creator=user_is_creator
                                        on_vote=on_vote
                                    />
                                }
                            })
                        }).into_any()
                    }
                }}
            </section>
        </div>
    }
}
