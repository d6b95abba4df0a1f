use crate::api::UiController;
use crate::components::{PostFeed, Recommendations};
use leptos::prelude::*;
use leptos::task::spawn_local;
use reddit_app::application::SessionState;

#[component]
pub fn HomePage() -> impl IntoView {
    let controller = expect_context::<UiController>();
    let session = expect_context::<RwSignal<SessionState>>();

    // Rebuilds once the viewer is known: immediately for anonymous viewers,
    // after the membership list arrives for signed-in ones.
    Effect::new(move |_| {
        let session = session.get();
        let controller = controller.clone();
        spawn_local(async move {
            if controller.refresh_for_session(&session).await.is_some() {
                controller.annotate_votes(&session.viewer()).await;
            }
        });
    });

    view! {
        <div class="page-content">
            <section class="page-content__main">
                <PostFeed home_page=true/>
            </section>
            <aside class="page-content__side">
                <Recommendations/>
            </aside>
        </div>
    }
}
