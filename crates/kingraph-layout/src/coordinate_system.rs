//! Rank direction handling.
//!
//! The pipeline always lays out top to bottom. For left-to-right / right-to-left layouts node
//! boxes are transposed before ranking and coordinates are transposed back afterwards; bottom-up
//! variants mirror the rank axis. `undo` finally translates the drawing so its top-left corner sits
//! at the configured margins.

use crate::{LayoutGraph, RankDir};

pub fn adjust(g: &mut LayoutGraph) {
    match g.graph().rankdir {
        RankDir::LR | RankDir::RL => swap_width_height(g),
        RankDir::TB | RankDir::BT => {}
    }
}

pub fn undo(g: &mut LayoutGraph) {
    let rankdir = g.graph().rankdir;
    if matches!(rankdir, RankDir::BT | RankDir::RL) {
        reverse_y(g);
    }
    if matches!(rankdir, RankDir::LR | RankDir::RL) {
        swap_xy(g);
        swap_width_height(g);
    }
    translate(g);
}

fn swap_width_height(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, n| {
        (n.width, n.height) = (n.height, n.width);
    });
}

fn reverse_y(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, n| {
        if let Some(y) = n.y {
            n.y = Some(-y);
        }
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            p.y = -p.y;
        }
    });
}

fn swap_xy(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            n.x = Some(y);
            n.y = Some(x);
        }
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            (p.x, p.y) = (p.y, p.x);
        }
    });
}

fn translate(g: &mut LayoutGraph) {
    let (marginx, marginy) = (g.graph().marginx, g.graph().marginy);
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for v in g.nodes() {
        let Some(n) = g.node(v) else {
            continue;
        };
        if let (Some(x), Some(y)) = (n.x, n.y) {
            min_x = min_x.min(x - n.width / 2.0);
            min_y = min_y.min(y - n.height / 2.0);
        }
    }
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }
    let (dx, dy) = (marginx - min_x, marginy - min_y);
    if dx == 0.0 && dy == 0.0 {
        return;
    }

    g.for_each_node_mut(|_, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            n.x = Some(x + dx);
            n.y = Some(y + dy);
        }
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
    });
}
