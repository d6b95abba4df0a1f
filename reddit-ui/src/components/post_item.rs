use crate::api::UiController;
use chrono::Utc;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use reddit_app::application::DeleteState;
use reddit_app::domain::{Post, VoteValue};

fn arrow_class(active: bool, direction: &str) -> String {
    if active {
        format!("post-item__arrow post-item__arrow--{direction}-active")
    } else {
        "post-item__arrow".to_string()
    }
}

/// One post card. Without `on_select_post` it renders as the single-post
/// page version, and a successful delete navigates back to the community.
#[component]
pub fn PostItem(
    post: Post,
    user_vote: Option<VoteValue>,
    user_is_creator: bool,
    #[prop(into)] on_vote: Callback<(Post, VoteValue)>,
    #[prop(optional)] on_select_post: Option<Callback<Post>>,
    #[prop(optional)] home_page: bool,
) -> impl IntoView {
    let controller = expect_context::<UiController>();
    let navigate = use_navigate();
    let single_post_page = on_select_post.is_none();
    let loading_delete = RwSignal::new(false);
    let error = RwSignal::new(false);

    let handle_delete = {
        let post = post.clone();
        move |_| {
            let started = DeleteState::started();
            loading_delete.set(started.loading);
            error.set(started.error);

            let controller = controller.clone();
            let navigate = navigate.clone();
            let post = post.clone();
            spawn_local(async move {
                let outcome = controller.delete_from_item(&post, single_post_page).await;
                // The card may already be gone once the post leaves the store.
                let _ = loading_delete.try_set(outcome.state.loading);
                let _ = error.try_set(outcome.state.error);
                if let Some(path) = outcome.redirect {
                    navigate(&path, Default::default());
                }
            });
        }
    };

    let vote_up = {
        let post = post.clone();
        move |_| on_vote.run((post.clone(), VoteValue::Up))
    };
    let vote_down = {
        let post = post.clone();
        move |_| on_vote.run((post.clone(), VoteValue::Down))
    };
    let select = {
        let post = post.clone();
        move |_| {
            if let Some(on_select_post) = on_select_post {
                on_select_post.run(post.clone());
            }
        }
    };

    let age = post.age_label(Utc::now());
    let permalink = post.permalink();
    let community_path = post.community_path();
    let card_class = if single_post_page {
        "post-item post-item--single"
    } else {
        "post-item"
    };

    view! {
        <article class=card_class>
            <div class="post-item__votes">
                <button
                    class=arrow_class(user_vote == Some(VoteValue::Up), "up")
                    aria-label="Upvote"
                    on:click=vote_up
                >
                    "▲"
                </button>
                <span class="post-item__score">{post.vote_status}</span>
                <button
                    class=arrow_class(user_vote == Some(VoteValue::Down), "down")
                    aria-label="Downvote"
                    on:click=vote_down
                >
                    "▼"
                </button>
            </div>
            <div class="post-item__main">
                {move || error.get().then(|| view! {
                    <div class="post-item__error" role="alert">"Error Deleting Post!"</div>
                })}
                <div class="post-item__meta">
                    {home_page.then(|| view! {
                        {post.community_image_url.clone().map(|src| view! {
                            <img class="post-item__community-icon" src=src alt=""/>
                        })}
                        <a class="post-item__community" href=community_path.clone()>
                            "r/" {post.community_id.clone()}
                        </a>
                        <span class="post-item__dot">"•"</span>
                    })}
                    <span>"Posted by u/" {post.creator_display_name.clone()} " " {age}</span>
                </div>
                <a class="post-item__title" href=permalink.clone() on:click=select>
                    {post.title.clone()}
                </a>
                {(!post.body.is_empty()).then(|| view! {
                    <p class="post-item__body">{post.body.clone()}</p>
                })}
                {post.image_url.clone().map(|src| view! {
                    <img class="post-item__image" src=src alt="Post image"/>
                })}
                {post.link.clone().map(|href| view! {
                    <a class="post-item__link" href=href.clone() target="_blank" rel="noopener noreferrer">
                        {href.clone()}
                    </a>
                })}
                <div class="post-item__actions">
                    <span class="post-item__action">{post.number_of_comments} " comments"</span>
                    <a class="post-item__action" href=permalink>"Share"</a>
                    {post.image_url.clone().zip(post.image_download_name()).map(|(src, name)| view! {
                        <a class="post-item__action" href=src download=name>"Save"</a>
                    })}
                    {user_is_creator.then(|| view! {
                        <button
                            class="post-item__action post-item__action--delete"
                            prop:disabled=move || loading_delete.get()
                            on:click=handle_delete
                        >
                            {move || if loading_delete.get() { "Deleting..." } else { "Delete" }}
                        </button>
                    })}
                </div>
            </div>
        </article>
    }
}
