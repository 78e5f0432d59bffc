// Unit tests for the animation applicator

use super::*;
use crate::memory_page::MemoryPage;
use pretty_assertions::assert_eq;

const CARDS: &str = r#"<html><body>
    <div class="card" style="animation: fade 1s; color: red">A</div>
    <div class="card">B</div>
</body></html>"#;

const PROPERTIES: &[&str] = &[
    "animation",
    "animation-name",
    "animation-duration",
    "animation-timing-function",
    "animation-iteration-count",
    "animation-fill-mode",
    "animation-play-state",
    "transform",
    "will-change",
    "color",
];

async fn snapshot(page: &MemoryPage, node: &ego_tree::NodeId) -> Vec<Option<String>> {
    let mut values = Vec::new();
    for property in PROPERTIES {
        values.push(page.inline_style(node, property).await.unwrap());
    }
    values
}

#[tokio::test(start_paused = true)]
async fn test_iteration_count_for_both_animations() {
    let page = MemoryPage::parse(CARDS);
    let cards = page.select_all(".card").await.unwrap();

    let applied = Applicator::new(AnimationSpec::default())
        .apply(&page, &cards)
        .await
        .unwrap();
    assert_eq!(applied, Applied { touched: 2, detached: 0 });

    for card in &cards {
        assert_eq!(
            page.computed_style(card, "animation-iteration-count").await.unwrap(),
            "infinite, infinite"
        );
        assert_eq!(
            page.computed_style(card, "animation-name").await.unwrap(),
            "pulse-start-needed, glow-pulse"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_apply_is_idempotent() {
    let once = MemoryPage::parse(CARDS);
    let twice = MemoryPage::parse(CARDS);
    let applicator = Applicator::new(AnimationSpec::default());

    let once_cards = once.select_all(".card").await.unwrap();
    applicator.apply(&once, &once_cards).await.unwrap();

    let twice_cards = twice.select_all(".card").await.unwrap();
    applicator.apply(&twice, &twice_cards).await.unwrap();
    applicator.apply(&twice, &twice_cards).await.unwrap();

    for (a, b) in once_cards.iter().zip(&twice_cards) {
        assert_eq!(snapshot(&once, a).await, snapshot(&twice, b).await);
    }
}

#[tokio::test(start_paused = true)]
async fn test_restart_leaves_same_style_as_plain_apply() {
    let plain = MemoryPage::parse(CARDS);
    let restarted = MemoryPage::parse(CARDS);
    let spec = AnimationSpec::default();

    let plain_cards = plain.select_all(".card").await.unwrap();
    Applicator::new(spec.clone())
        .with_restart(None)
        .apply(&plain, &plain_cards)
        .await
        .unwrap();

    let restarted_cards = restarted.select_all(".card").await.unwrap();
    Applicator::new(spec)
        .apply(&restarted, &restarted_cards)
        .await
        .unwrap();

    for (a, b) in plain_cards.iter().zip(&restarted_cards) {
        assert_eq!(snapshot(&plain, a).await, snapshot(&restarted, b).await);
    }
    // Unrelated declarations survive
    assert_eq!(
        restarted.inline_style(&restarted_cards[0], "color").await.unwrap().as_deref(),
        Some("red")
    );
}

#[tokio::test(start_paused = true)]
async fn test_restart_phases() {
    let page = MemoryPage::parse(CARDS);
    let card = page.select_all(".card").await.unwrap()[1];
    let applicator = Applicator::new(AnimationSpec::default());

    applicator.apply_one(&page, &card).await.unwrap();
    applicator
        .restart_step(&page, &card, RestartPhase::Cleared)
        .await
        .unwrap();
    assert_eq!(page.computed_style(&card, "animation-name").await.unwrap(), "none");

    applicator
        .restart_step(&page, &card, RestartPhase::Reassigned)
        .await
        .unwrap();
    assert_eq!(
        page.computed_style(&card, "animation-name").await.unwrap(),
        "pulse-start-needed, glow-pulse"
    );
}

#[tokio::test(start_paused = true)]
async fn test_overrides_author_important_rule() {
    let page = MemoryPage::parse(CARDS)
        .with_author_rule(".card", "animation", "none", true)
        .unwrap();
    let cards = page.select_all(".card").await.unwrap();
    assert_eq!(page.computed_style(&cards[1], "animation-name").await.unwrap(), "none");

    Applicator::new(AnimationSpec::default())
        .apply(&page, &cards)
        .await
        .unwrap();
    assert_eq!(
        page.computed_style(&cards[1], "animation-name").await.unwrap(),
        "pulse-start-needed, glow-pulse"
    );
}

#[tokio::test(start_paused = true)]
async fn test_detached_cards_are_counted() {
    let page = MemoryPage::parse(CARDS);
    let cards = page.select_all(".card").await.unwrap();
    page.detach(&cards[0]);

    let applied = Applicator::new(AnimationSpec::default())
        .apply(&page, &cards)
        .await
        .unwrap();
    assert_eq!(applied, Applied { touched: 1, detached: 1 });
}
