use super::{ErrorDisplay, PostItem, PostLoader};
use crate::api::UiController;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reddit_app::application::{PostStore, SessionState};
use reddit_app::domain::{Post, VoteValue};
use reddit_errors::AppError;

/// Vote handler shared by feed and single-post views. Anonymous clicks raise
/// `auth_prompt` instead of voting.
pub fn use_vote_handler(auth_prompt: RwSignal<bool>) -> Callback<(Post, VoteValue)> {
    let controller = expect_context::<UiController>();
    let session = expect_context::<RwSignal<SessionState>>();

    Callback::new(move |(post, value): (Post, VoteValue)| {
        let controller = controller.clone();
        let viewer = session.get_untracked().viewer();
        spawn_local(async move {
            let community_id = post.community_id.clone();
            match controller.vote(&viewer, &post, value, &community_id).await {
                Ok(_) => {}
                Err(AppError::Unauthenticated) => auth_prompt.set(true),
                Err(e) => tracing::warn!("Vote on {} ignored: {}", post.id, e),
            }
        });
    })
}

/// Renders the posts currently held in the store.
#[component]
pub fn PostFeed(#[prop(optional)] home_page: bool) -> impl IntoView {
    let controller = expect_context::<UiController>();
    let store = expect_context::<RwSignal<PostStore>>();
    let session = expect_context::<RwSignal<SessionState>>();
    let auth_prompt = RwSignal::new(false);
    let on_vote = use_vote_handler(auth_prompt);
    let on_select_post = Callback::new(move |post: Post| {
        controller.select_post(&post);
    });

    view! {
        {move || auth_prompt.get().then(|| view! {
            <ErrorDisplay
                message=AppError::Unauthenticated.user_message().to_string()
                on_dismiss=Callback::new(move |_| auth_prompt.set(false))
            />
        })}
        {move || {
            if store.with(|s| s.is_loading()) {
                return view! { <PostLoader/> }.into_any();
            }
            let viewer = session.with(|s| s.viewer());
            store.with(|s| {
                if s.posts().is_empty() {
                    return view! {
                        <p class="feed__empty">"No posts yet."</p>
                    }.into_any();
                }
                view! {
                    <div class="feed">
                        {s.posts().iter().map(|post| view! {
                            <PostItem
                                post=post.clone()
                                user_vote=s.user_vote(&post.id)
                                user_is_creator=viewer.is_creator_of(&post.creator_id)
                                on_vote=on_vote
                                on_select_post=on_select_post
                                home_page=home_page
                            />
                        }).collect_view()}
                    </div>
                }.into_any()
            })
        }}
    }
}
