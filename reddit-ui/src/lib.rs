pub mod api;
pub mod components;
pub mod pages;

use api::{get_current_user, ServerFnRepository, UiController};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;
use reddit_app::application::{FeedController, PostStore, SessionState};
use reddit_app::config::FeedConfig;

use pages::{CommunityPage, HomePage, PostPage};

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let store = RwSignal::new(PostStore::default());
    let session = RwSignal::new(SessionState::Resolving);
    let controller: UiController = FeedController::new(ServerFnRepository, FeedConfig::default())
        .on_change(move |snapshot| store.set(snapshot.clone()));
    provide_context(store);
    provide_context(session);
    provide_context(controller.clone());

    let current_user = LocalResource::new(get_current_user);
    Effect::new(move |_| {
        let Some(result) = current_user.get() else {
            return;
        };
        let user = result.unwrap_or_else(|e| {
            tracing::error!("Failed to resolve the current user: {}", e);
            None
        });
        let controller = controller.clone();
        spawn_local(async move {
            session.set(controller.resolve_session(user).await);
        });
    });

    view! {
        <Title text="Reddit Clone"/>
        <Meta name="description" content="An awesome looking Reddit Clone"/>

        <Router>
            <Navbar/>
            <main class="container">
                <Routes fallback=|| "Page not found">
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/r/:community_id") view=CommunityPage/>
                    <Route path=path!("/r/:community_id/comments/:post_id") view=PostPage/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn Navbar() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();

    view! {
        <header class="navbar">
            <a href="/" class="navbar__brand">"reddit"</a>
            {move || match session.get() {
                SessionState::Resolving => ().into_any(),
                SessionState::Anonymous => view! {
                    <a href="/auth/demo" rel="external" class="navbar__login">"Log In"</a>
                }.into_any(),
                SessionState::SignedIn { user, .. } => view! {
                    <span class="navbar__user">"u/" {user.display_name}</span>
                    <form action="/auth/logout" method="post" class="navbar__logout">
                        <button type="submit">"Log Out"</button>
                    </form>
                }.into_any(),
            }}
        </header>
    }
}

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
