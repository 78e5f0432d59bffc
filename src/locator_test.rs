// Unit tests for the element locator

use super::*;
use crate::memory_page::MemoryPage;
use pretty_assertions::assert_eq;

fn markers() -> Vec<&'static str> {
    vec!["지금 시작하세요", "시작 필요"]
}

fn text_only_config() -> LocatorConfig {
    LocatorConfig {
        strategies: StrategyList::new(vec![MatchStrategy::text_scan(&markers(), 0)]),
        ..LocatorConfig::default()
    }
}

#[tokio::test]
async fn test_attribute_strategy_single_element() {
    let page = MemoryPage::parse(
        r#"<html><body>
            <div data-x-start-needed="true" id="target">Card</div>
            <div data-x-start-needed="false">Done</div>
            <p>Other</p>
        </body></html>"#,
    );
    let config = LocatorConfig {
        strategies: StrategyList::new(vec![MatchStrategy::attribute(
            "data-x-start-needed",
            Some("true"),
            0,
        )]),
        ..LocatorConfig::default()
    };

    let located = locate(&page, &config).await.unwrap().unwrap();
    assert_eq!(located.elements.len(), 1);
    assert_eq!(page.select_all("#target").await.unwrap(), located.elements);
}

#[tokio::test]
async fn test_text_scan_dedups_shared_container() {
    let page = MemoryPage::parse(
        r#"<html><body>
            <div class="a">
                <p>🚨 지금 시작하세요</p>
                <p>상태: 시작 필요</p>
            </div>
            <div class="b"><span>지금 시작하세요</span></div>
        </body></html>"#,
    );

    let located = locate(&page, &text_only_config()).await.unwrap().unwrap();
    let classes: Vec<String> = {
        let mut out = Vec::new();
        for node in &located.elements {
            out.push(page.describe(node).await.unwrap().class_name);
        }
        out
    };
    assert_eq!(classes, vec!["a", "b"]);
}

#[tokio::test]
async fn test_two_markers_in_one_element_counted_once() {
    let page = MemoryPage::parse(
        r#"<html><body><div class="card">시작 필요 · 지금 시작하세요</div></body></html>"#,
    );

    let located = locate(&page, &text_only_config()).await.unwrap().unwrap();
    assert_eq!(located.elements.len(), 1);
}

#[tokio::test]
async fn test_text_hit_without_container_falls_back() {
    let page = MemoryPage::parse(
        r#"<html><body><section><b>지금 시작하세요</b></section></body></html>"#,
    );

    let located = locate(&page, &text_only_config()).await.unwrap().unwrap();
    assert_eq!(located.elements.len(), 1);
    assert_eq!(page.describe(&located.elements[0]).await.unwrap().tag, "b");
}

#[tokio::test]
async fn test_cascade_falls_through_in_rank_order() {
    // Class was stripped by the host, only text remains
    let page = MemoryPage::parse(
        r#"<html><body><div class="x"><span>시작 필요</span></div></body></html>"#,
    );

    let located = locate(&page, &LocatorConfig::default()).await.unwrap().unwrap();
    assert!(matches!(located.strategy.kind, StrategyKind::TextScan { .. }));
    assert_eq!(located.strategy.rank, 3);
}

#[tokio::test]
async fn test_attribute_wins_over_class() {
    let page = MemoryPage::parse(
        r#"<html><body>
            <div class="ps-start-needed-card">A</div>
            <div class="ps-start-needed-card" data-ps-start-needed="true">B</div>
        </body></html>"#,
    );

    let located = locate(&page, &LocatorConfig::default()).await.unwrap().unwrap();
    assert_eq!(located.strategy.rank, 0);
    assert_eq!(located.elements.len(), 1);
}

#[tokio::test]
async fn test_invalid_selector_skipped() {
    let page = MemoryPage::parse(r#"<html><body><div class="card">x</div></body></html>"#);
    let config = LocatorConfig {
        strategies: StrategyList::new(vec![
            MatchStrategy::class("bad[", 0),
            MatchStrategy::class("card", 1),
        ]),
        ..LocatorConfig::default()
    };

    let located = locate(&page, &config).await.unwrap().unwrap();
    assert_eq!(located.strategy, MatchStrategy::class("card", 1));
}

#[tokio::test]
async fn test_scope_limits_selector_strategies() {
    let page = MemoryPage::parse(
        r#"<html><body>
            <div data-ps-scope="other"><div class="ps-start-needed-card">A</div></div>
            <div data-ps-scope="input_hub"><div class="ps-start-needed-card">B</div></div>
        </body></html>"#,
    );
    let config = LocatorConfig {
        scope: Some("input_hub".to_string()),
        ..LocatorConfig::default()
    };

    let located = locate(&page, &config).await.unwrap().unwrap();
    assert_eq!(located.elements.len(), 1);
    assert_eq!(page.describe(&located.elements[0]).await.unwrap().text, "B");
}

#[tokio::test]
async fn test_nothing_found() {
    let page = MemoryPage::parse(r#"<html><body><p>All done</p></body></html>"#);
    assert!(locate(&page, &LocatorConfig::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_hints_list_near_misses() {
    let page = MemoryPage::parse(
        r#"<html><body>
            <div data-ps-start-needed="false" class="status">Waiting</div>
            <div class="ps-card">Card shell</div>
            <div class="ps-card">Card shell</div>
            <p>Other</p>
        </body></html>"#,
    );

    let hints = hints(&page, &LocatorConfig::default()).await.unwrap();
    let classes: Vec<&str> = hints.iter().map(|h| h.class_name.as_str()).collect();
    assert_eq!(classes, vec!["status", "ps-card", "ps-card"]);
}

#[test]
fn test_dedup_preserving_order() {
    assert_eq!(dedup_preserving_order(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
}
