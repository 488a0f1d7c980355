use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::pipeline::Frame;
use super::theme::PARTICLE;

const ARROW_SIZE: f64 = 8.0;
const PARTICLE_RADIUS: f64 = 4.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let (width, height) = frame.size;
	ctx.set_fill_style_str(frame.palette.background);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let t = frame.transform;
	let _ = ctx.translate(t.x, t.y);
	let _ = ctx.scale(t.k, t.k);
	draw_links(frame, ctx);
	draw_nodes(frame, ctx);
	draw_particle(frame, ctx);
	ctx.restore();
}

fn draw_links(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let radii = frame.radii();
	let k = frame.transform.k;

	for link in &frame.scene.links {
		let visual = frame.visual(link.phase);
		if visual.opacity <= 0.0 {
			continue;
		}
		let style = frame.link_style(link);
		let Some(curve) = frame.link_curve(link, &radii) else {
			continue;
		};
		let (x2, y2) = curve.end;
		let chord = (x2 - curve.start.0).hypot(y2 - curve.start.1);
		let arrow = if style.arrow { ARROW_SIZE.min(chord) } else { 0.0 };
		let (ux, uy) = curve.end_direction();
		let body = curve.shortened(arrow);

		ctx.set_global_alpha(0.7 * ease_out_cubic(visual.opacity));
		ctx.set_stroke_style_str(&style.stroke);
		ctx.set_line_width(style.width);
		ctx.begin_path();
		ctx.move_to(body.start.0, body.start.1);
		ctx.quadratic_curve_to(body.control.0, body.control.1, body.end.0, body.end.1);
		ctx.stroke();

		if style.arrow {
			ctx.set_fill_style_str(&style.stroke);
			let (back_x, back_y) = body.end;
			let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
			ctx.begin_path();
			ctx.move_to(x2, y2);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		if let Some(label) = &style.label {
			ctx.set_fill_style_str(&style.label_color);
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			ctx.set_text_align("center");
			let (lx, ly) = curve.point_at(0.5);
			let _ = ctx.fill_text(label, lx, ly - 4.0);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let k = frame.transform.k;
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in &frame.scene.nodes {
		let visual = frame.visual(node.phase);
		if visual.opacity <= 0.0 {
			continue;
		}
		let style = frame.node_style(node);
		let (x, y) = (node.x, node.y);
		let radius = style.radius * ease_out_cubic(visual.scale);
		if radius <= 0.0 {
			continue;
		}

		ctx.set_global_alpha(visual.opacity);
		if frame.overlay.node(&node.id).is_some() {
			// glow behind emphasised nodes
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.8, x, y, radius * 1.8) {
				let _ = gradient.add_color_stop(0.0, &style.stroke);
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, radius * 1.8, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&style.fill);
		ctx.fill();
		ctx.set_stroke_style_str(&style.stroke);
		ctx.set_line_width(style.stroke_width);
		ctx.stroke();

		ctx.set_fill_style_str(&style.text);
		ctx.set_font(&format!("{}px sans-serif", radius * 0.6));
		let _ = ctx.fill_text(style.icon, x, y);

		if let Some(label) = &style.label {
			ctx.set_font(&format!("{}px sans-serif", 12.0 / k.max(0.5)));
			let _ = ctx.fill_text(label, x, y + radius + 14.0);
		}
		if let Some(badge) = &style.badge {
			ctx.set_font(&format!("bold {}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(badge, x + radius, y - radius);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_particle(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let Some((x, y)) = frame.marker else {
		return;
	};
	ctx.begin_path();
	let _ = ctx.arc(x, y, PARTICLE_RADIUS, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(PARTICLE);
	ctx.fill();
	ctx.set_stroke_style_str("white");
	ctx.set_line_width(2.0);
	ctx.stroke();
}
