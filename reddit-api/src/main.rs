use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use leptos::prelude::*;
use leptos_axum::{generate_route_list, handle_server_fns_with_context, LeptosRoutes};
use reddit_app::infrastructure::memory::MemoryRepository;
use reddit_app::AppContext;
use reddit_ui::api::SESSION_USER_KEY;
use reddit_ui::App;
use tower_http::compression::CompressionLayer;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let conf = get_configuration(Some("Cargo.toml")).expect("Failed to load Leptos config");
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;

    let app_context = AppContext::from_env()
        .await
        .expect("Failed to initialise storage backend");

    let routes = generate_route_list(App);

    let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);

    let app = Router::new()
        .route("/auth/demo", get({
            let ctx = app_context.clone();
            move |session: Session| {
                let ctx = ctx.clone();
                async move { demo_login(ctx, session).await }
            }
        }))
        .route("/auth/logout", post(logout))
        .route("/api/{*fn_name}", post({
            let ctx = app_context.clone();
            move |req| {
                let ctx = ctx.clone();
                async move {
                    handle_server_fns_with_context(
                        move || provide_context(ctx.clone()),
                        req
                    ).await
                }
            }
        }))
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            {
                let ctx = app_context.clone();
                move || provide_context(ctx.clone())
            },
            {
                let leptos_options = leptos_options.clone();
                move || shell(leptos_options.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .layer(CompressionLayer::new())
        .layer(session_layer)
        .with_state(leptos_options);

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        "Feed page size {}, {} recommended communities",
        app_context.config.page_size,
        app_context.config.recommendation_count
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}

/// Signs in as the seeded demo user. Only offered by the in-memory backend;
/// real sign-in is handled outside this app.
async fn demo_login(ctx: AppContext, session: Session) -> Response {
    if !ctx.backend.is_memory() {
        return (StatusCode::NOT_FOUND, "Demo login needs the in-memory backend").into_response();
    }

    let user = MemoryRepository::demo_user();
    if let Err(e) = session.insert(SESSION_USER_KEY, &user).await {
        tracing::error!("Failed to store demo session: {}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    tracing::info!("Signed in as {}", user.id);
    Redirect::to("/").into_response()
}

async fn logout(session: Session) -> Redirect {
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to clear session: {}", e);
    }
    Redirect::to("/")
}

fn shell(options: LeptosOptions) -> impl IntoView {
    use leptos_meta::*;

    let css = r#"
        :root {
            --canvas: #dae0e6;
            --card: #ffffff;
            --border: #ccc;
            --border-hover: #898989;
            --muted: #787c7e;
            --text: #1c1c1c;
            --brand: #ff4500;
            --upvote: #ff4500;
            --downvote: #4379ff;
            --link: #0079d3;
            --danger: #b3261e;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: 'IBM Plex Sans', -apple-system, sans-serif;
            background: var(--canvas);
            color: var(--text);
            min-height: 100vh;
        }
        a { color: inherit; text-decoration: none; }
        .navbar {
            display: flex; align-items: center; justify-content: space-between;
            padding: 0.5rem 1.25rem; background: var(--card); border-bottom: 1px solid var(--border);
        }
        .navbar__brand { color: var(--brand); font-weight: 800; font-size: 1.4rem; }
        .navbar__login, .navbar__logout button {
            padding: 0.35rem 1.1rem; border-radius: 999px; border: 1px solid var(--link);
            background: var(--link); color: #fff; font-weight: 600; cursor: pointer;
        }
        .navbar__user { margin-right: 0.75rem; font-size: 0.9rem; }
        .navbar__logout { display: inline; }
        .container { max-width: 1000px; margin: 0 auto; padding: 1.5rem 1rem; }
        .community-header { background: var(--card); padding: 1rem; border-radius: 4px; margin-bottom: 1rem; }
        .page-content { display: flex; gap: 1.5rem; align-items: flex-start; }
        .page-content__main { flex: 1; min-width: 0; display: flex; flex-direction: column; gap: 0.75rem; }
        .page-content__side { width: 312px; display: none; }
        @media (min-width: 960px) { .page-content__side { display: block; } }
        .feed { display: flex; flex-direction: column; gap: 0.75rem; }
        .feed__empty { color: var(--muted); text-align: center; padding: 2rem; }
        .post-item {
            display: flex; background: var(--card); border: 1px solid var(--border); border-radius: 4px;
        }
        .post-item:hover { border-color: var(--border-hover); }
        .post-item--single { border-color: var(--card); }
        .post-item__votes {
            display: flex; flex-direction: column; align-items: center; gap: 0.25rem;
            width: 40px; padding: 0.5rem 0; background: #f8f9fa; border-radius: 4px 0 0 4px;
        }
        .post-item__arrow { border: none; background: none; color: var(--muted); cursor: pointer; font-size: 1.1rem; }
        .post-item__arrow--up-active { color: var(--upvote); }
        .post-item__arrow--down-active { color: var(--downvote); }
        .post-item__score { font-size: 0.8rem; font-weight: 700; }
        .post-item__main { flex: 1; padding: 0.6rem 0.75rem; display: flex; flex-direction: column; gap: 0.4rem; }
        .post-item__meta { display: flex; align-items: center; gap: 0.35rem; font-size: 0.75rem; color: var(--muted); }
        .post-item__community { color: var(--text); font-weight: 700; }
        .post-item__community:hover { text-decoration: underline; }
        .post-item__community-icon { width: 20px; height: 20px; border-radius: 50%; }
        .post-item__title { font-size: 1.1rem; font-weight: 600; }
        .post-item__body { font-size: 0.9rem; }
        .post-item__image { max-width: 100%; max-height: 460px; object-fit: contain; }
        .post-item__link { color: var(--link); font-size: 0.85rem; word-break: break-all; }
        .post-item__actions { display: flex; gap: 0.75rem; font-size: 0.8rem; color: var(--muted); font-weight: 700; }
        .post-item__action { border: none; background: none; color: inherit; font: inherit; cursor: pointer; }
        .post-item__action--delete:disabled { cursor: wait; }
        .post-item__error { background: #fdecea; color: var(--danger); padding: 0.5rem 0.75rem; border-radius: 4px; }
        .post-loader__card { background: var(--card); border-radius: 4px; padding: 1rem; margin-bottom: 0.75rem; }
        .post-loader__line, .post-loader__block {
            background: linear-gradient(90deg, #eee, #f7f7f7, #eee); background-size: 200% 100%;
            animation: shimmer 1.2s linear infinite; border-radius: 4px; margin-bottom: 0.6rem;
        }
        .post-loader__line { height: 12px; }
        .post-loader__line--short { width: 40%; }
        .post-loader__block { height: 180px; }
        @keyframes shimmer { to { background-position: -200% 0; } }
        .recommendations { background: var(--card); border: 1px solid var(--border); border-radius: 4px; overflow: hidden; }
        .recommendations__title { background: var(--link); color: #fff; font-size: 1rem; padding: 2.5rem 0.75rem 0.75rem; }
        .recommendations__list { list-style: decimal inside; }
        .recommendations__item {
            display: flex; align-items: center; gap: 0.5rem; padding: 0.6rem 0.75rem;
            border-bottom: 1px solid #edeff1; font-size: 0.9rem;
        }
        .recommendations__icon { width: 24px; height: 24px; border-radius: 50%; }
        .recommendations__name { font-weight: 600; flex: 1; }
        .recommendations__members { color: var(--muted); font-size: 0.75rem; }
        .recommendations__loading, .recommendations__empty { padding: 0.75rem; color: var(--muted); }
        .error { background: #fdecea; border: 1px solid var(--danger); border-radius: 4px; padding: 0.75rem 1rem; }
        .error__message { color: var(--danger); }
        .error__dismiss { margin-top: 0.5rem; border: none; background: none; color: var(--link); cursor: pointer; }
    "#;

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <link rel="icon" href="/favicon.ico"/>
                <style>{css}</style>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}
