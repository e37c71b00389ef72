//! Rank direction transforms.
//!
//! The phases assume top-to-bottom ranks. Left-to-right layouts swap the leaf axes before
//! ranking and swap positions back afterwards; bottom-up layouts mirror the y axis.

use crate::{LayoutGraph, RankDir};

pub(crate) fn adjust(g: &mut LayoutGraph) {
    match g.graph().rankdir {
        RankDir::LR | RankDir::RL => swap_width_height(g),
        RankDir::TB | RankDir::BT => {}
    }
}

pub(crate) fn undo(g: &mut LayoutGraph) {
    match g.graph().rankdir {
        RankDir::BT | RankDir::RL => reverse_y(g),
        RankDir::TB | RankDir::LR => {}
    }

    match g.graph().rankdir {
        RankDir::LR | RankDir::RL => {
            swap_xy(g);
            swap_width_height(g);
        }
        RankDir::TB | RankDir::BT => {}
    }
}

fn swap_width_height(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        (n.width, n.height) = (n.height, n.width);
    });
}

fn reverse_y(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        if let Some(y) = n.y {
            n.y = Some(-y);
        }
    });
    g.for_each_edge_mut(|_key, e| {
        for p in &mut e.points {
            p.y = -p.y;
        }
    });
}

fn swap_xy(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            n.x = Some(y);
            n.y = Some(x);
        }
    });
    g.for_each_edge_mut(|_key, e| {
        for p in &mut e.points {
            (p.x, p.y) = (p.y, p.x);
        }
    });
}
