//! Incremental search over grouped items.
//!
//! A [`Finder`] is bound to a query input and a container of groups. On
//! every key-up it recomputes, from scratch, which items match the query:
//!
//! 1. an item is visible iff the query is empty or one of its titles
//!    contains the query (case-insensitive substring)
//! 2. a group is visible iff at least one of its items is visible
//! 3. the no-results indicator is shown iff no group is visible
//!
//! Hidden items and groups carry the [`HIDDEN_CLASS`] class; the indicator
//! is toggled through display.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{ElementTree, Event, EventKind, Selector};
use crate::error::Result;

/// Class marking filtered-out items and groups.
pub const HIDDEN_CLASS: &str = "hidden";

/// Selectors used to locate the parts of a search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct FinderSelectors {
    pub query_input: String,
    pub items_root: String,
    pub group: String,
    pub item: String,
    pub title: String,
    pub no_results: String,
    pub hint: String,
}

impl Default for FinderSelectors {
    fn default() -> Self {
        FinderSelectors {
            query_input: "#IncSearch".to_string(),
            items_root: ".operators-list".to_string(),
            group: ".type".to_string(),
            item: "ul li".to_string(),
            title: ".title".to_string(),
            no_results: ".no-results".to_string(),
            hint: ".inc-search-form .hint .pseudo".to_string(),
        }
    }
}

impl FinderSelectors {
    /// Parse selectors from JSON; missing fields keep their defaults.
    ///
    /// Every selector must parse, so a page configured here selects the
    /// same parts in the browser and in the in-memory document.
    pub fn from_json(json: &str) -> Result<Self> {
        let selectors: Self = serde_json::from_str(json)?;
        selectors.validate()?;
        Ok(selectors)
    }

    /// Check that every selector is supported.
    pub fn validate(&self) -> Result<()> {
        [
            &self.query_input,
            &self.items_root,
            &self.group,
            &self.item,
            &self.title,
            &self.no_results,
            &self.hint,
        ]
        .into_iter()
        .try_for_each(|s| Selector::parse(s).map(drop))
    }
}

/// Construction options for a [`Finder`].
///
/// Element parts may be given as resolved nodes; anything left unset is
/// resolved from [`FinderSelectors`].
#[derive(Debug, Clone)]
pub struct FinderConfig<N> {
    pub selectors: FinderSelectors,
    pub query_input: Option<Vec<N>>,
    pub items_root: Option<Vec<N>>,
    pub no_results: Option<Vec<N>>,
}

impl<N> Default for FinderConfig<N> {
    fn default() -> Self {
        FinderConfig {
            selectors: FinderSelectors::default(),
            query_input: None,
            items_root: None,
            no_results: None,
        }
    }
}

impl<N> FinderConfig<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selectors(mut self, selectors: FinderSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_query_input(mut self, nodes: Vec<N>) -> Self {
        self.query_input = Some(nodes);
        self
    }

    pub fn with_items_root(mut self, nodes: Vec<N>) -> Self {
        self.items_root = Some(nodes);
        self
    }

    pub fn with_no_results(mut self, nodes: Vec<N>) -> Self {
        self.no_results = Some(nodes);
        self
    }
}

/// Summary of one filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub visible_items: usize,
    pub visible_groups: usize,
    pub no_results_shown: bool,
}

/// Whether one title matches an already lower-cased query.
#[inline]
pub fn title_matches(query_lower: &str, title: &str) -> bool {
    title.to_lowercase().contains(query_lower)
}

/// Item visibility for a query and the item's titles.
///
/// The empty query matches everything, including items without titles.
/// Whitespace is not trimmed.
pub fn item_visible<S: AsRef<str>>(query: &str, titles: &[S]) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    titles.iter().any(|t| title_matches(&query, t.as_ref()))
}

/// Live filter bound to a query input and a set of groups.
#[derive(Debug, Clone)]
pub struct Finder<N> {
    query_inputs: Vec<N>,
    groups: Vec<N>,
    no_results: Vec<N>,
    hints: Vec<N>,
    item_selector: String,
    title_selector: String,
}

impl<N: Clone + PartialEq> Finder<N> {
    /// Resolve the page parts and bind to the query input.
    ///
    /// Returns `None` when the query input resolves to nothing; nothing is
    /// bound in that case.
    pub fn attach<T>(tree: &mut T, config: FinderConfig<N>) -> Option<Self>
    where
        T: ElementTree<Node = N>,
    {
        let FinderConfig {
            selectors,
            query_input,
            items_root,
            no_results,
        } = config;

        let query_inputs = query_input.unwrap_or_else(|| tree.select(&selectors.query_input));
        if query_inputs.is_empty() {
            debug!(selector = %selectors.query_input, "no query input, finder not attached");
            return None;
        }

        let roots = items_root.unwrap_or_else(|| tree.select(&selectors.items_root));
        let groups: Vec<N> = roots
            .iter()
            .flat_map(|root| tree.select_within(root, &selectors.group))
            .collect();
        let no_results = no_results.unwrap_or_else(|| tree.select(&selectors.no_results));
        let hints = tree.select(&selectors.hint);

        for input in &query_inputs {
            tree.listen(input, EventKind::KeyUp);
            tree.suppress_default(input, EventKind::Submit);
        }
        for hint in &hints {
            tree.listen(hint, EventKind::Click);
        }

        debug!(
            groups = groups.len(),
            hints = hints.len(),
            "finder attached"
        );

        Some(Finder {
            query_inputs,
            groups,
            no_results,
            hints,
            item_selector: selectors.item,
            title_selector: selectors.title,
        })
    }

    pub fn groups(&self) -> &[N] {
        &self.groups
    }

    pub fn hints(&self) -> &[N] {
        &self.hints
    }

    /// Current text of the (first) query input.
    pub fn query<T>(&self, tree: &T) -> String
    where
        T: ElementTree<Node = N>,
    {
        self.query_inputs
            .first()
            .map(|input| tree.value(input))
            .unwrap_or_default()
    }

    /// Recompute visibility for `query`.
    pub fn filter<T>(&self, tree: &mut T, query: &str) -> FilterOutcome
    where
        T: ElementTree<Node = N>,
    {
        let query_lower = query.to_lowercase();
        let unrestricted = query_lower.is_empty();
        let mut outcome = FilterOutcome::default();

        for group in &self.groups {
            let items = tree.select_within(group, &self.item_selector);
            let mut visible_in_group = 0;

            for item in &items {
                let matches = unrestricted
                    || tree
                        .select_within(item, &self.title_selector)
                        .iter()
                        .any(|title| title_matches(&query_lower, &tree.text(title)));

                if matches {
                    tree.remove_class(item, HIDDEN_CLASS);
                    visible_in_group += 1;
                } else {
                    tree.add_class(item, HIDDEN_CLASS);
                }
            }

            if visible_in_group > 0 {
                tree.remove_class(group, HIDDEN_CLASS);
                outcome.visible_groups += 1;
            } else {
                tree.add_class(group, HIDDEN_CLASS);
            }
            outcome.visible_items += visible_in_group;
        }

        outcome.no_results_shown = outcome.visible_groups == 0;
        for indicator in &self.no_results {
            tree.set_displayed(indicator, outcome.no_results_shown);
        }

        debug!(
            query,
            visible_items = outcome.visible_items,
            visible_groups = outcome.visible_groups,
            no_results = outcome.no_results_shown,
            "filtered"
        );
        outcome
    }

    /// Filter using the query input's current text.
    pub fn refresh<T>(&self, tree: &mut T) -> FilterOutcome
    where
        T: ElementTree<Node = N>,
    {
        let query = self.query(tree);
        self.filter(tree, &query)
    }

    /// Use a hint's text as the query, as if it had been typed.
    pub fn apply_hint<T>(&self, tree: &mut T, hint: &N) -> FilterOutcome
    where
        T: ElementTree<Node = N>,
    {
        let text = tree.text(hint);
        for input in &self.query_inputs {
            tree.set_value(input, &text);
        }
        self.filter(tree, &text)
    }

    /// Route a host event. Returns the outcome when the event triggered a
    /// filter pass.
    pub fn handle_event<T>(&self, tree: &mut T, event: &Event<N>) -> Option<FilterOutcome>
    where
        T: ElementTree<Node = N>,
    {
        match event.kind {
            EventKind::KeyUp if self.query_inputs.contains(&event.target) => {
                let query = tree.value(&event.target);
                Some(self.filter(tree, &query))
            }
            EventKind::Click if self.hints.contains(&event.target) => {
                Some(self.apply_hint(tree, &event.target))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, El, NodeId};

    fn item(titles: &[&str]) -> El {
        El::new("li").children(titles.iter().map(|t| El::new("span").class("title").text(t)))
    }

    fn page(groups: &[&[&[&str]]]) -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        doc.build(
            root,
            El::new("form")
                .class("inc-search-form")
                .child(El::new("input").id("IncSearch"))
                .child(
                    El::new("div")
                        .class("hint")
                        .child(El::new("span").class("pseudo").text("sub")),
                ),
        );
        doc.build(
            root,
            El::new("div").class("operators-list").children(groups.iter().map(|items| {
                El::new("div")
                    .class("type")
                    .child(El::new("ul").children(items.iter().map(|titles| item(titles))))
            })),
        );
        doc.build(root, El::new("div").class("no-results"));
        doc
    }

    fn attach(doc: &mut Document) -> Finder<NodeId> {
        Finder::attach(doc, FinderConfig::new()).unwrap()
    }

    #[test]
    fn test_item_visible_rules() {
        assert!(item_visible("", &[] as &[&str]));
        assert!(!item_visible("a", &[] as &[&str]));
        assert!(item_visible("ADD", &["Addition"]));
        assert!(item_visible("dit", &["Addition"]));
        assert!(!item_visible("subtract", &["Addition"]));
        assert!(item_visible("x", &["Addition", "Max"]));
    }

    #[test]
    fn test_whitespace_query_is_literal() {
        assert!(!item_visible(" ", &["Addition"]));
        assert!(item_visible(" ", &["Bit shift"]));
    }

    #[test]
    fn test_attach_without_input_is_noop() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.build(root, El::new("div").class("operators-list"));
        assert!(Finder::<NodeId>::attach(&mut doc, FinderConfig::new()).is_none());
    }

    #[test]
    fn test_attach_binds_keyup_and_suppresses_submit() {
        let mut doc = page(&[&[&["Addition"]]]);
        let finder = attach(&mut doc);
        let input = doc.select("#IncSearch")[0];
        let keyup = doc.dispatch(&Event::new(EventKind::KeyUp, input));
        let form = doc.select("form")[0];
        let submit = doc.dispatch(&Event::new(EventKind::Submit, form));
        assert!(keyup.delivered);
        assert!(submit.default_prevented);
        assert_eq!(finder.groups().len(), 1);
        assert_eq!(finder.hints().len(), 1);
    }

    #[test]
    fn test_single_item_scenario() {
        let mut doc = page(&[&[&["Addition"]]]);
        let finder = attach(&mut doc);
        let item = doc.select("ul li")[0];
        let group = doc.select(".type")[0];
        let indicator = doc.select(".no-results")[0];

        let outcome = finder.filter(&mut doc, "add");
        assert!(!doc.has_class(&item, HIDDEN_CLASS));
        assert!(!doc.has_class(&group, HIDDEN_CLASS));
        assert!(!doc.is_displayed(indicator));
        assert_eq!(outcome.visible_items, 1);

        let outcome = finder.filter(&mut doc, "subtract");
        assert!(doc.has_class(&item, HIDDEN_CLASS));
        assert!(doc.has_class(&group, HIDDEN_CLASS));
        assert!(doc.is_displayed(indicator));
        assert!(outcome.no_results_shown);
    }

    #[test]
    fn test_group_hidden_only_when_all_items_hidden() {
        let mut doc = page(&[&[&["Addition"], &["Subtraction"]], &[&["Modulo"]]]);
        let finder = attach(&mut doc);
        let groups = doc.select(".type");

        let outcome = finder.filter(&mut doc, "tion");
        assert_eq!(outcome.visible_items, 2);
        assert_eq!(outcome.visible_groups, 1);
        assert!(!doc.has_class(&groups[0], HIDDEN_CLASS));
        assert!(doc.has_class(&groups[1], HIDDEN_CLASS));
        assert!(!outcome.no_results_shown);
    }

    #[test]
    fn test_item_without_titles() {
        let mut doc = page(&[&[&[]]]);
        let finder = attach(&mut doc);
        let item = doc.select("ul li")[0];

        finder.filter(&mut doc, "a");
        assert!(doc.has_class(&item, HIDDEN_CLASS));
        finder.filter(&mut doc, "");
        assert!(!doc.has_class(&item, HIDDEN_CLASS));
    }

    #[test]
    fn test_empty_query_restores_everything() {
        let mut doc = page(&[&[&["Addition"], &["Subtraction"]], &[&["Modulo"]]]);
        let finder = attach(&mut doc);
        for q in ["zzz", "mod", "SUB", "  "] {
            finder.filter(&mut doc, q);
        }
        let outcome = finder.filter(&mut doc, "");
        assert_eq!(outcome.visible_items, 3);
        assert_eq!(outcome.visible_groups, 2);
        assert!(doc.select(".hidden").is_empty());
        assert!(!doc.is_displayed(doc.select(".no-results")[0]));
    }

    #[test]
    fn test_keyup_event_reads_input_value() {
        let mut doc = page(&[&[&["Addition"]], &[&["Modulo"]]]);
        let finder = attach(&mut doc);
        let input = doc.select("#IncSearch")[0];
        doc.set_value(&input, "MOD");

        let outcome = finder
            .handle_event(&mut doc, &Event::new(EventKind::KeyUp, input))
            .unwrap();
        assert_eq!(outcome.visible_groups, 1);

        let other = doc.select(".type")[0];
        assert!(finder
            .handle_event(&mut doc, &Event::new(EventKind::KeyUp, other))
            .is_none());
    }

    #[test]
    fn test_hint_click_fills_query_and_filters() {
        let mut doc = page(&[&[&["Addition"]], &[&["Subtraction"]]]);
        let finder = attach(&mut doc);
        let hint = finder.hints()[0];

        let outcome = finder
            .handle_event(&mut doc, &Event::new(EventKind::Click, hint))
            .unwrap();
        assert_eq!(finder.query(&doc), "sub");
        assert_eq!(outcome.visible_groups, 1);
        assert_eq!(finder.refresh(&mut doc), outcome);
    }

    #[test]
    fn test_custom_selectors_and_nodes() {
        let mut doc = Document::new();
        let root = doc.root();
        let input = doc.build(root, El::new("input").class("q"));
        let list = doc.build(
            root,
            El::new("section").child(
                El::new("article").class("cat").child(
                    El::new("p").class("entry").child(El::new("b").text("Cosine")),
                ),
            ),
        );
        let empty = doc.build(root, El::new("p").class("empty"));

        let selectors = FinderSelectors {
            group: ".cat".to_string(),
            item: ".entry".to_string(),
            title: "b".to_string(),
            ..FinderSelectors::default()
        };
        let finder = Finder::attach(
            &mut doc,
            FinderConfig::new()
                .with_selectors(selectors)
                .with_query_input(vec![input])
                .with_items_root(vec![list])
                .with_no_results(vec![empty]),
        )
        .unwrap();

        assert_eq!(finder.filter(&mut doc, "cos").visible_items, 1);
        assert!(finder.filter(&mut doc, "tan").no_results_shown);
        assert!(doc.is_displayed(empty));
        let outcome = finder.filter(&mut doc, "sin");
        assert_eq!(outcome.visible_items, 1);
        assert!(!doc.is_displayed(empty));
    }

    #[test]
    fn test_selectors_from_json_keep_defaults() {
        let s = FinderSelectors::from_json(r#"{"group": ".kind"}"#).unwrap();
        assert_eq!(s.group, ".kind");
        assert_eq!(s.item, "ul li");
        assert!(FinderSelectors::from_json(r#"{"bogus": 1}"#).is_err());
    }

    #[test]
    fn test_selectors_from_json_reject_unsupported_syntax() {
        let err = FinderSelectors::from_json(r#"{"item": "li:hover"}"#).unwrap_err();
        assert!(matches!(err, crate::Error::Selector { .. }));
        assert!(FinderSelectors::from_json(r#"{"item": "ul > li:first-child"}"#).is_ok());
        assert!(FinderSelectors::default().validate().is_ok());
    }

    #[test]
    fn test_child_combinator_item_selector() {
        let mut doc = page(&[&[&["Addition"], &["Division"]], &[&["Modulo"]]]);
        let selectors = FinderSelectors::from_json(r#"{"item": "ul > li"}"#).unwrap();
        let finder = Finder::attach(&mut doc, FinderConfig::new().with_selectors(selectors)).unwrap();

        let outcome = finder.filter(&mut doc, "");
        assert_eq!(outcome.visible_items, 3);
        assert_eq!(outcome.visible_groups, 2);
        assert_eq!(finder.filter(&mut doc, "div").visible_items, 1);
    }
}
