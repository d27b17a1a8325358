//! Selectors understood by the in-memory document.
//!
//! Parsed with `cssparser`. Supported grammar:
//! - type selectors (`li`), the universal selector (`*`)
//! - class (`.title`), id (`#IncSearch`) and attribute (`[href]`,
//!   `[type="search"]`) selectors, chained (`li.item#x`)
//! - `:first-child`, `:last-child`, `:only-child`, `:empty` and
//!   `:not(<compound>)`
//! - descendant (` `), child (`>`), adjacent (`+`) and general (`~`)
//!   sibling combinators
//! - selector lists (`.a, .b`)
//!
//! Anything else is rejected at parse time, so a selector accepted here
//! selects the same elements as `querySelectorAll` does in a browser.

use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, Token};

use crate::error::{Error, Result};

type ParseResult<'i, T> = std::result::Result<T, ParseError<'i, String>>;

/// Relation between two adjacent compounds of a complex selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// ` `: any ancestor.
    Descendant,
    /// `>`: the parent.
    Child,
    /// `+`: the immediately preceding sibling.
    AdjacentSibling,
    /// `~`: any preceding sibling.
    GeneralSibling,
}

/// `[name]` or `[name=value]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Not(Box<Compound>),
}

/// One compound selector: optional tag, optional id, classes, attributes
/// and pseudo-classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
    pub pseudo_classes: Vec<PseudoClass>,
}

/// Compounds joined by combinators, outermost first.
///
/// `combinators[i]` relates `compounds[i]` to `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// What matching needs to know about a tree.
pub trait MatchContext {
    type Node: Copy;

    fn tag(&self, node: Self::Node) -> &str;
    fn id(&self, node: Self::Node) -> Option<&str>;
    fn classes(&self, node: Self::Node) -> &[String];
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn child_count(&self, node: Self::Node) -> usize;
}

impl Compound {
    /// Whether `node` matches this compound on its own.
    pub fn matches<C: MatchContext>(&self, cx: &C, node: C::Node) -> bool {
        if let Some(t) = &self.tag {
            if !t.eq_ignore_ascii_case(cx.tag(node)) {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if cx.id(node) != Some(want.as_str()) {
                return false;
            }
        }
        let classes = cx.classes(node);
        if !self.classes.iter().all(|c| classes.iter().any(|have| have == c)) {
            return false;
        }
        let attributes_match = self.attributes.iter().all(|attr| {
            match (cx.attribute(node, &attr.name), &attr.value) {
                (Some(_), None) => true,
                (Some(have), Some(want)) => have == *want,
                (None, _) => false,
            }
        });
        attributes_match && self.pseudo_classes.iter().all(|p| p.matches(cx, node))
    }
}

impl PseudoClass {
    fn matches<C: MatchContext>(&self, cx: &C, node: C::Node) -> bool {
        match self {
            PseudoClass::FirstChild => cx.previous_sibling(node).is_none(),
            PseudoClass::LastChild => cx.next_sibling(node).is_none(),
            PseudoClass::OnlyChild => {
                cx.previous_sibling(node).is_none() && cx.next_sibling(node).is_none()
            }
            PseudoClass::Empty => cx.child_count(node) == 0,
            PseudoClass::Not(inner) => !inner.matches(cx, node),
        }
    }
}

impl Complex {
    /// Whether `node` is the subject of this selector.
    pub fn matches<C: MatchContext>(&self, cx: &C, node: C::Node) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_at(cx, node, n - 1),
        }
    }

    fn matches_at<C: MatchContext>(&self, cx: &C, node: C::Node, index: usize) -> bool {
        if !self.compounds[index].matches(cx, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let prev = index - 1;
        match self.combinators[prev] {
            Combinator::Child => cx
                .parent(node)
                .is_some_and(|p| self.matches_at(cx, p, prev)),
            Combinator::AdjacentSibling => cx
                .previous_sibling(node)
                .is_some_and(|s| self.matches_at(cx, s, prev)),
            Combinator::Descendant => {
                let mut current = cx.parent(node);
                while let Some(ancestor) = current {
                    if self.matches_at(cx, ancestor, prev) {
                        return true;
                    }
                    current = cx.parent(ancestor);
                }
                false
            }
            Combinator::GeneralSibling => {
                let mut current = cx.previous_sibling(node);
                while let Some(sibling) = current {
                    if self.matches_at(cx, sibling, prev) {
                        return true;
                    }
                    current = cx.previous_sibling(sibling);
                }
                false
            }
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Accumulates compounds and combinators while tokens stream in.
#[derive(Default)]
struct ChainBuilder {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
    current: Option<Compound>,
    pending: Option<Combinator>,
    pending_explicit: bool,
}

impl ChainBuilder {
    fn close_current(&mut self) {
        if let Some(compound) = self.current.take() {
            self.compounds.push(compound);
        }
    }

    fn whitespace(&mut self) {
        if self.current.is_some() {
            self.close_current();
            self.pending = Some(Combinator::Descendant);
            self.pending_explicit = false;
        }
    }

    fn combinator<'i>(
        &mut self,
        parser: &Parser<'i, '_>,
        combinator: Combinator,
    ) -> ParseResult<'i, ()> {
        self.close_current();
        if self.compounds.is_empty() {
            return Err(parser.new_custom_error("combinator without a left-hand side"));
        }
        if self.pending_explicit {
            return Err(parser.new_custom_error("two combinators in a row"));
        }
        self.pending = Some(combinator);
        self.pending_explicit = true;
        Ok(())
    }

    /// The compound being built, starting a new one if needed. The flag is
    /// true for a freshly started compound.
    fn compound(&mut self) -> (&mut Compound, bool) {
        let fresh = self.current.is_none();
        if fresh {
            if let Some(combinator) = self.pending.take() {
                self.combinators.push(combinator);
            }
            self.pending_explicit = false;
        }
        (self.current.get_or_insert_with(Compound::default), fresh)
    }

    fn finish<'i>(mut self, parser: &Parser<'i, '_>) -> ParseResult<'i, Complex> {
        self.close_current();
        if self.pending_explicit {
            return Err(parser.new_custom_error("combinator without a right-hand side"));
        }
        if self.compounds.is_empty() {
            return Err(parser.new_custom_error("empty selector"));
        }
        Ok(Complex {
            compounds: self.compounds,
            combinators: self.combinators,
        })
    }
}

fn parse_attribute<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, AttributeSelector> {
    let name = parser.expect_ident_cloned()?.to_ascii_lowercase();
    if parser.is_exhausted() {
        return Ok(AttributeSelector { name, value: None });
    }
    match parser.next()?.clone() {
        Token::Delim('=') => {}
        other => {
            return Err(parser.new_custom_error(format!("unsupported attribute operator `{other:?}`")))
        }
    }
    let value = parser.expect_ident_or_string()?.to_string();
    parser.expect_exhausted()?;
    Ok(AttributeSelector {
        name,
        value: Some(value),
    })
}

fn parse_pseudo_class<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, PseudoClass> {
    let token = parser.next_including_whitespace()?.clone();
    match token {
        Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "first-child" => Ok(PseudoClass::FirstChild),
            "last-child" => Ok(PseudoClass::LastChild),
            "only-child" => Ok(PseudoClass::OnlyChild),
            "empty" => Ok(PseudoClass::Empty),
            other => Err(parser.new_custom_error(format!("unsupported pseudo-class `:{other}`"))),
        },
        Token::Function(name) if name.eq_ignore_ascii_case("not") => {
            let inner = parser.parse_nested_block(|p| -> ParseResult<'i, Compound> {
                p.skip_whitespace();
                let mut builder = ChainBuilder::default();
                parse_simple_selectors(p, &mut builder)?;
                let complex = builder.finish(p)?;
                match <[Compound; 1]>::try_from(complex.compounds) {
                    Ok([compound]) => Ok(compound),
                    Err(_) => Err(p.new_custom_error(":not() takes a single compound")),
                }
            })?;
            Ok(PseudoClass::Not(Box::new(inner)))
        }
        other => Err(parser.new_custom_error(format!("unexpected `{other:?}` after `:`"))),
    }
}

/// Consume tokens into `builder` until the input (or block) ends.
fn parse_simple_selectors<'i>(
    parser: &mut Parser<'i, '_>,
    builder: &mut ChainBuilder,
) -> ParseResult<'i, ()> {
    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(()),
        };
        match token {
            Token::WhiteSpace(_) => builder.whitespace(),
            Token::Delim('>') => builder.combinator(parser, Combinator::Child)?,
            Token::Delim('+') => builder.combinator(parser, Combinator::AdjacentSibling)?,
            Token::Delim('~') => builder.combinator(parser, Combinator::GeneralSibling)?,
            Token::Ident(name) => {
                let (compound, fresh) = builder.compound();
                if !fresh {
                    return Err(parser.new_custom_error("type selector must come first"));
                }
                compound.tag = Some(name.to_ascii_lowercase());
            }
            Token::Delim('*') => {
                if !builder.compound().1 {
                    return Err(parser.new_custom_error("universal selector must come first"));
                }
            }
            Token::Delim('.') => {
                let class = match parser.next_including_whitespace()?.clone() {
                    Token::Ident(class) => class.to_string(),
                    _ => return Err(parser.new_custom_error("expected a class name after `.`")),
                };
                builder.compound().0.classes.push(class);
            }
            Token::IDHash(id) => {
                let (compound, _) = builder.compound();
                if compound.id.is_some() {
                    return Err(parser.new_custom_error("more than one id in a compound"));
                }
                compound.id = Some(id.to_string());
            }
            Token::SquareBracketBlock => {
                let attribute = parser.parse_nested_block(parse_attribute)?;
                builder.compound().0.attributes.push(attribute);
            }
            Token::Colon => {
                let pseudo = parse_pseudo_class(parser)?;
                builder.compound().0.pseudo_classes.push(pseudo);
            }
            other => return Err(parser.new_custom_error(format!("unexpected `{other:?}`"))),
        }
    }
}

fn parse_complex<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Complex> {
    parser.skip_whitespace();
    let mut builder = ChainBuilder::default();
    parse_simple_selectors(parser, &mut builder)?;
    builder.finish(parser)
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);
        let alternatives = parser
            .parse_comma_separated(parse_complex)
            .map_err(|e| {
                let reason = match e.kind {
                    ParseErrorKind::Custom(message) => message,
                    ParseErrorKind::Basic(kind) => format!("{kind:?}"),
                };
                Error::selector(source, reason)
            })?;
        Ok(Selector { alternatives })
    }

    /// Alternatives of the list.
    pub fn alternatives(&self) -> &[Complex] {
        &self.alternatives
    }

    /// Whether `node` matches any alternative.
    pub fn matches<C: MatchContext>(&self, cx: &C, node: C::Node) -> bool {
        self.alternatives.iter().any(|complex| complex.matches(cx, node))
    }
}
