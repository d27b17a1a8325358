//! Renderers for glow visuals.
//!
//! - [`materialize`] builds nodes in an [`ElementTree`]
//! - [`to_markup`] serializes a visual to standalone HTML/SVG markup

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::backend::{FilteredClone, ImageInfo, SvgCanvas, Visual};
use crate::dom::{ElementTree, Namespace};
use crate::error::Result;

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Build the nodes for `visual`. `source` is the target image; clones are
/// taken from it. The returned node is detached.
pub fn materialize<T: ElementTree>(
    tree: &mut T,
    source: &T::Node,
    visual: &Visual,
) -> Result<T::Node> {
    match visual {
        Visual::Clone(clone) => materialize_clone(tree, source, clone),
        Visual::Svg(canvas) => materialize_svg(tree, canvas),
    }
}

fn materialize_clone<T: ElementTree>(
    tree: &mut T,
    source: &T::Node,
    clone: &FilteredClone,
) -> Result<T::Node> {
    let node = tree.clone_deep(source)?;
    tree.remove_attribute(&node, "class");
    tree.set_style(&node, clone.property, &clone.filter);
    tree.set_style(&node, "width", "100%");
    tree.set_style(&node, "height", "100%");
    tree.set_style(&node, "left", "0");
    tree.set_style(&node, "top", "0");
    Ok(node)
}

fn materialize_svg<T: ElementTree>(tree: &mut T, canvas: &SvgCanvas) -> Result<T::Node> {
    let svg = tree.create_element(Namespace::Svg, "svg")?;
    tree.set_attribute(&svg, "xmlns", Namespace::Svg.uri());
    tree.set_attribute(&svg, "version", "1.1");
    tree.set_attribute(&svg, "width", &canvas.width.to_string());
    tree.set_attribute(&svg, "height", &canvas.height.to_string());

    let defs = tree.create_element(Namespace::Svg, "defs")?;
    let filter = tree.create_element(Namespace::Svg, "filter")?;
    tree.set_attribute(&filter, "id", &canvas.graph.id);
    for primitive in &canvas.graph.primitives {
        let node = tree.create_element(Namespace::Svg, primitive.tag())?;
        for (name, value) in primitive.attributes() {
            tree.set_attribute(&node, name, &value);
        }
        tree.append_child(&filter, &node)?;
    }
    tree.append_child(&defs, &filter)?;
    tree.append_child(&svg, &defs)?;

    let image = tree.create_element(Namespace::Svg, "image")?;
    tree.set_attribute(&image, "x", &canvas.image.x.to_string());
    tree.set_attribute(&image, "y", &canvas.image.y.to_string());
    tree.set_attribute(&image, "width", &canvas.image.width.to_string());
    tree.set_attribute(&image, "height", &canvas.image.height.to_string());
    tree.set_attribute(&image, "href", &canvas.image.href);
    tree.set_attribute(&image, "filter", &format!("url(#{})", canvas.graph.id));
    tree.append_child(&svg, &image)?;

    Ok(svg)
}

type Attributes<'a> = Vec<(&'a str, String)>;

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    attributes: Attributes<'_>,
    empty: bool,
) {
    let start = BytesStart::new(tag)
        .with_attributes(attributes.iter().map(|(name, value)| (*name, value.as_str())));
    let event = if empty {
        Event::Empty(start)
    } else {
        Event::Start(start)
    };
    let _ = writer.write_event(event);
}

fn close_element<W: Write>(writer: &mut Writer<W>, tag: &str) {
    let _ = writer.write_event(Event::End(BytesEnd::new(tag)));
}

fn write_clone<W: Write>(writer: &mut Writer<W>, clone: &FilteredClone, image: &ImageInfo) {
    let style = format!(
        "{}: {}; width: 100%; height: 100%; left: 0; top: 0",
        clone.property, clone.filter
    );
    write_element(
        writer,
        "img",
        vec![("src", image.src.clone()), ("style", style)],
        true,
    );
}

fn write_svg<W: Write>(writer: &mut Writer<W>, canvas: &SvgCanvas) {
    write_element(
        writer,
        "svg",
        vec![
            ("xmlns", Namespace::Svg.uri().to_string()),
            ("xmlns:xlink", XLINK_NS.to_string()),
            ("version", "1.1".to_string()),
            ("width", canvas.width.to_string()),
            ("height", canvas.height.to_string()),
        ],
        false,
    );
    write_element(writer, "defs", Vec::new(), false);
    write_element(writer, "filter", vec![("id", canvas.graph.id.clone())], false);
    for primitive in &canvas.graph.primitives {
        write_element(writer, primitive.tag(), primitive.attributes(), true);
    }
    close_element(writer, "filter");
    close_element(writer, "defs");

    let href = &canvas.image.href;
    write_element(
        writer,
        "image",
        vec![
            ("x", canvas.image.x.to_string()),
            ("y", canvas.image.y.to_string()),
            ("width", canvas.image.width.to_string()),
            ("height", canvas.image.height.to_string()),
            ("href", href.clone()),
            ("xlink:href", href.clone()),
            ("filter", format!("url(#{})", canvas.graph.id)),
        ],
        true,
    );
    close_element(writer, "svg");
}

/// Serialize `visual` to markup. `image` supplies the source of clones.
pub fn to_markup(visual: &Visual, image: &ImageInfo) -> String {
    let mut writer = Writer::new(Vec::new());
    match visual {
        Visual::Clone(clone) => write_clone(&mut writer, clone, image),
        Visual::Svg(canvas) => write_svg(&mut writer, canvas),
    }
    String::from_utf8(writer.into_inner()).unwrap_or_default()
}
