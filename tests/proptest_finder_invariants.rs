//! Property-based invariant tests for the incremental filter.
//!
//! For any page of groups/items/titles and any sequence of queries:
//!
//! 1. An item is visible iff the query is empty or one of its titles
//!    contains the query, ignoring case.
//! 2. A group is visible iff at least one of its items is visible.
//! 3. The no-results indicator is shown iff no group is visible.
//! 4. Filtering with "" restores everything, whatever came before.
//! 5. The outcome counts agree with the tree.

use iglow::dom::{Document, El, ElementTree, NodeId};
use iglow::finder::{item_visible, Finder, FinderConfig, HIDDEN_CLASS};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

type Page = Vec<Vec<Vec<String>>>;

fn title() -> impl Strategy<Value = String> {
    "[abAB ]{0,6}"
}

fn query() -> impl Strategy<Value = String> {
    "[abAB]{0,3}"
}

fn page_shape() -> impl Strategy<Value = Page> {
    let item = proptest::collection::vec(title(), 0..=3);
    let group = proptest::collection::vec(item, 0..=4);
    proptest::collection::vec(group, 0..=4)
}

fn build(page: &Page) -> (Document, Finder<NodeId>) {
    let mut doc = Document::new();
    let root = doc.root();
    doc.build(root, El::new("input").id("IncSearch"));
    doc.build(
        root,
        El::new("div").class("operators-list").children(page.iter().map(|items| {
            El::new("div").class("type").child(El::new("ul").children(items.iter().map(
                |titles| {
                    El::new("li").children(
                        titles.iter().map(|t| El::new("span").class("title").text(t)),
                    )
                },
            )))
        })),
    );
    doc.build(root, El::new("div").class("no-results"));
    let finder = Finder::attach(&mut doc, FinderConfig::new()).expect("query input exists");
    (doc, finder)
}

fn check(doc: &Document, page: &Page, q: &str) -> Result<(), TestCaseError> {
    let groups = doc.select(".type");
    prop_assert_eq!(groups.len(), page.len());
    let mut any_group = false;

    for (group, items) in groups.iter().zip(page) {
        let lis = doc.select_within(group, "ul li");
        prop_assert_eq!(lis.len(), items.len());
        let mut any_item = false;
        for (li, titles) in lis.iter().zip(items) {
            let visible = !doc.has_class(li, HIDDEN_CLASS);
            prop_assert_eq!(visible, item_visible(q, titles), "query {:?} titles {:?}", q, titles);
            any_item |= visible;
        }
        prop_assert_eq!(!doc.has_class(group, HIDDEN_CLASS), any_item);
        any_group |= any_item;
    }

    let indicator = doc.select(".no-results")[0];
    prop_assert_eq!(doc.is_displayed(indicator), !any_group);
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Visibility rules after any query sequence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn visibility_follows_last_query(
        page in page_shape(),
        queries in proptest::collection::vec(query(), 1..=5),
    ) {
        let (mut doc, finder) = build(&page);
        for q in &queries {
            finder.filter(&mut doc, q);
        }
        let last = queries.last().map(String::as_str).unwrap_or("");
        check(&doc, &page, last)?;
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Empty query restores full visibility
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn empty_query_restores(
        page in page_shape(),
        queries in proptest::collection::vec(query(), 0..=5),
    ) {
        let (mut doc, finder) = build(&page);
        for q in &queries {
            finder.filter(&mut doc, q);
        }
        let outcome = finder.filter(&mut doc, "");

        prop_assert!(doc.select("ul li").iter().all(|li| !doc.has_class(li, HIDDEN_CLASS)));
        let non_empty_groups = page.iter().filter(|items| !items.is_empty()).count();
        prop_assert_eq!(outcome.visible_groups, non_empty_groups);
        prop_assert_eq!(outcome.no_results_shown, non_empty_groups == 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Outcome counts agree with the tree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn outcome_matches_tree(page in page_shape(), q in query()) {
        let (mut doc, finder) = build(&page);
        let outcome = finder.filter(&mut doc, &q);

        let visible_items = doc
            .select("ul li")
            .iter()
            .filter(|li| !doc.has_class(li, HIDDEN_CLASS))
            .count();
        let visible_groups = doc
            .select(".type")
            .iter()
            .filter(|g| !doc.has_class(g, HIDDEN_CLASS))
            .count();
        prop_assert_eq!(outcome.visible_items, visible_items);
        prop_assert_eq!(outcome.visible_groups, visible_groups);
        prop_assert_eq!(outcome.no_results_shown, visible_groups == 0);
    }
}
