//! Static SVG snapshot of a frame.

use std::fmt::Write;

use super::pipeline::Frame;

const ARROW_SIZE: f64 = 8.0;

/// Escape text for use in XML content and attribute values.
pub fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			c => out.push(c),
		}
	}
	out
}

/// Serialize the bound elements of `frame` as a standalone SVG document.
/// Elements still fading out are left out.
pub fn export(frame: &Frame<'_>) -> String {
	let (w, h) = frame.size;
	let t = frame.transform;
	let radii = frame.radii();
	let mut out = String::new();

	let _ = writeln!(
		out,
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
	);
	let _ = writeln!(
		out,
		r#"<defs><marker id="arrow" viewBox="0 -5 10 10" refX="10" markerWidth="{ARROW_SIZE}" markerHeight="{ARROW_SIZE}" orient="auto"><path d="M0,-5L10,0L0,5" fill="{}"/></marker></defs>"#,
		frame.palette.link_stroke
	);
	let _ = writeln!(
		out,
		r#"<rect width="100%" height="100%" fill="{}"/>"#,
		frame.palette.background
	);
	let _ = writeln!(out, r#"<g transform="translate({},{}) scale({})">"#, t.x, t.y, t.k);

	out.push_str("<g class=\"links\">\n");
	for link in frame.scene.links.iter().filter(|l| l.slots.is_some()) {
		let style = frame.link_style(link);
		let Some(curve) = frame.link_curve(link, &radii) else {
			continue;
		};
		let marker = if style.arrow {
			r#" marker-end="url(#arrow)""#
		} else {
			""
		};
		let (a, c, b) = (curve.start, curve.control, curve.end);
		let _ = writeln!(
			out,
			r#"<path data-id="{}" d="M{:.2},{:.2} Q{:.2},{:.2} {:.2},{:.2}" fill="none" stroke="{}" stroke-width="{}"{marker}/>"#,
			escape(&link.id),
			a.0,
			a.1,
			c.0,
			c.1,
			b.0,
			b.1,
			escape(&style.stroke),
			style.width,
		);
		if let Some(label) = &style.label {
			let (lx, ly) = curve.point_at(0.5);
			let _ = writeln!(
				out,
				r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="10" fill="{}">{}</text>"#,
				lx,
				ly,
				escape(&style.label_color),
				escape(label),
			);
		}
	}
	out.push_str("</g>\n<g class=\"nodes\">\n");

	for node in frame.scene.nodes.iter().filter(|n| n.slot.is_some()) {
		let style = frame.node_style(node);
		let _ = writeln!(
			out,
			r#"<g data-id="{}" transform="translate({:.2},{:.2})">"#,
			escape(&node.id),
			node.x,
			node.y
		);
		let _ = writeln!(
			out,
			r#"<circle r="{:.2}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
			style.radius,
			escape(&style.fill),
			escape(&style.stroke),
			style.stroke_width,
		);
		let _ = writeln!(
			out,
			r#"<text text-anchor="middle" dy="0.35em" font-size="{:.1}" fill="{}">{}</text>"#,
			style.radius * 0.6,
			escape(&style.text),
			style.icon,
		);
		if let Some(label) = &style.label {
			let _ = writeln!(
				out,
				r#"<text text-anchor="middle" y="{:.2}" font-size="12" fill="{}">{}</text>"#,
				style.radius + 14.0,
				escape(&style.text),
				escape(label),
			);
		}
		out.push_str("</g>\n");
	}
	out.push_str("</g>\n</g>\n</svg>\n");
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::interaction::Highlights;
	use crate::components::force_graph::model::{Expansion, TraversalBounds, prepare};
	use crate::components::force_graph::options::RenderOptions;
	use crate::components::force_graph::pipeline::{Scene, StyleContext};
	use crate::components::force_graph::theme::Theme;
	use crate::components::force_graph::types::{DomainGraph, DomainNode, Point};
	use crate::components::force_graph::viewport::Transform;

	fn frame_over(scene: &Scene) -> Frame<'_> {
		Frame {
			scene,
			palette: Theme::Dark.palette(),
			transform: Transform::new(10.0, 20.0, 2.0),
			size: (640.0, 480.0),
			overlay: Highlights::default(),
			marker: None,
			now: 0.0,
		}
	}

	#[test]
	fn escapes_markup() {
		assert_eq!(escape(r#"a<b & "c"'"#), "a&lt;b &amp; &quot;c&quot;&apos;");
	}

	#[test]
	fn exports_nodes_links_and_viewport() {
		let mut graph = DomainGraph {
			central: "r".into(),
			nodes: vec![
				DomainNode::new("r", "Tom & <Jerry>").with_children(["c"]),
				DomainNode::new("c", "child").with_parent("r"),
			],
			..Default::default()
		};
		graph.nodes[1].position = Some(Point::new(200.0, 0.0));
		let p = prepare(&graph, None, &Expansion::default(), TraversalBounds::default(), (0.0, 0.0)).unwrap();
		let options = RenderOptions::default();
		let mut scene = Scene::default();
		scene.apply(
			&p.nodes,
			&p.links,
			StyleContext {
				palette: Theme::Dark.palette(),
				options: &options,
			},
			0.0,
		);

		let svg = export(&frame_over(&scene));
		assert!(svg.starts_with("<svg"));
		assert!(svg.trim_end().ends_with("</svg>"));
		assert!(svg.contains("translate(10,20) scale(2)"));
		assert!(svg.contains("Tom &amp; &lt;Jerry"));
		assert!(svg.contains(r#"<path data-id="r-c" d="M20.00,0.00 Q100.00,0.00 180.00,0.00""#));
		assert!(svg.contains(r##"fill="#1f2937""##));
		assert_eq!(svg.matches("<circle").count(), 2);
	}
}
