// Fixture pages shared between tests and the standalone fixture server

use axum::{
    Router,
    extract::Query,
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

#[derive(Deserialize)]
struct DelayQuery {
    ms: Option<u64>,
}

pub fn create_app() -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/immediate", get(immediate_page))
        .route("/delayed", get(delayed_page))
        .route("/class-only", get(class_only_page))
        .route("/text-only", get(text_only_page))
        .route("/none", get(none_page))
        .route("/rerender", get(rerender_page))
        .layer(CorsLayer::permissive())
}

const BASE_STYLE: &str = r#"
    <style>
        .hub { display: flex; gap: 12px; font-family: sans-serif; }
        .ps-card { padding: 16px; border: 1px solid #ccc; border-radius: 8px; }
    </style>
"#;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title>{BASE_STYLE}</head>
<body>
{body}
</body>
</html>"#
    ))
}

fn card(attribute: bool, class: &str, text: &str) -> String {
    let attr = if attribute {
        r#" data-ps-start-needed="true""#
    } else {
        ""
    };
    format!(r#"<div class="{class}"{attr}><b>{text}</b></div>"#)
}

async fn index_page() -> Html<String> {
    page(
        "Fixtures",
        r#"<ul>
            <li><a href="/immediate">immediate</a></li>
            <li><a href="/delayed?ms=1500">delayed</a></li>
            <li><a href="/class-only">class-only</a></li>
            <li><a href="/text-only">text-only</a></li>
            <li><a href="/none">none</a></li>
            <li><a href="/rerender">rerender</a></li>
        </ul>"#,
    )
}

async fn immediate_page() -> Html<String> {
    let cards = [
        card(true, "ps-card ps-start-needed-card", "🚨 지금 시작하세요"),
        card(true, "ps-card ps-start-needed-card", "🚨 지금 시작하세요"),
        card(false, "ps-card", "✅ 진행 중"),
    ]
    .join("\n");
    page(
        "Immediate",
        &format!(r#"<div class="hub" data-ps-scope="input_hub">{cards}</div>"#),
    )
}

async fn delayed_page(Query(query): Query<DelayQuery>) -> Html<String> {
    let ms = query.ms.unwrap_or(1500);
    let card = card(true, "ps-card ps-start-needed-card", "🚨 지금 시작하세요");
    page(
        "Delayed",
        &format!(
            r#"<div class="hub" id="hub"></div>
<script>
    setTimeout(() => {{
        document.getElementById('hub').innerHTML = `{card}`;
    }}, {ms});
</script>"#
        ),
    )
}

async fn class_only_page() -> Html<String> {
    let cards = card(false, "ps-card ps-start-needed-card", "Start required");
    page("Class only", &format!(r#"<div class="hub">{cards}</div>"#))
}

async fn text_only_page() -> Html<String> {
    page(
        "Text only",
        r#"<div class="hub">
            <div class="tile"><span>⚠️</span> <span>시작 필요</span></div>
            <div class="tile">완료</div>
        </div>"#,
    )
}

async fn none_page() -> Html<String> {
    page(
        "None",
        r#"<div class="hub"><div class="ps-card" data-ps-start-needed="false">완료</div></div>"#,
    )
}

async fn rerender_page() -> Html<String> {
    let cards = card(true, "ps-card ps-start-needed-card", "🚨 지금 시작하세요");
    page(
        "Rerender",
        &format!(
            r#"<div class="hub" id="hub">{cards}</div>
<script>
    // The host re-renders the widget shortly after load
    setTimeout(() => {{
        const hub = document.getElementById('hub');
        hub.innerHTML = hub.innerHTML;
    }}, 250);
</script>"#
        ),
    )
}
