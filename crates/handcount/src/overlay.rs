//! Display overlay for classified hands.
//!
//! This module does not draw anything itself. It produces a list of [`DrawCommand`]s that a
//! renderer can execute on top of the camera image.

use std::fmt;

use crate::{
    hand::{landmark::CONNECTIVITY, Hand},
    landmark::Landmark,
    pipeline::FrameReport,
    rect::Rect,
    resolution::Resolution,
};

/// An 8-bit RGBA color.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct Color([u8; 4]);

impl Color {
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const YELLOW: Self = Self([255, 255, 0, 255]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.0[3]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r(),
            self.g(),
            self.b(),
            self.a()
        )
    }
}

/// A primitive to draw onto a frame, in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Text whose baseline starts at `(x, y)`.
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Color,
    },
    /// Outline of a rectangle.
    Rect { rect: Rect, color: Color },
    Line {
        start: (i32, i32),
        end: (i32, i32),
        color: Color,
    },
    /// A small marker centered on a point.
    Marker { x: i32, y: i32, color: Color },
}

const TEXT_X: i32 = 10;
const TEXT_Y: i32 = 50;
const LINE_HEIGHT: i32 = 30;

const TEXT_COLOR: Color = Color::GREEN;
const BOX_COLOR: Color = Color::YELLOW;
const BONE_COLOR: Color = Color::WHITE;
const JOINT_COLOR: Color = Color::RED;

/// Computes everything to draw for one frame.
///
/// `hands` are the hands `report` was computed from. Each one that has a valid landmark layout is
/// drawn as a skeleton; then every classified hand gets a `"<label>: <count> fingers"` line at the
/// top left (one line per detection slot) and its bounding box, clipped to the frame.
pub fn draw_list(report: &FrameReport, hands: &[Hand], res: Resolution) -> Vec<DrawCommand> {
    let mut cmds = Vec::new();

    for hand in hands.iter().filter(|hand| hand.check().is_ok()) {
        draw_skeleton(hand, res, &mut cmds);
    }

    for hand in report.hands() {
        cmds.push(DrawCommand::Text {
            x: TEXT_X,
            y: TEXT_Y + hand.slot() as i32 * LINE_HEIGHT,
            text: hand.overlay_text(),
            color: TEXT_COLOR,
        });

        match hand.result().bounding_box().clip_to(res) {
            Some(rect) => cmds.push(DrawCommand::Rect {
                rect,
                color: BOX_COLOR,
            }),
            None => log::trace!("slot {}: bounding box outside of frame", hand.slot()),
        }
    }

    cmds
}

fn draw_skeleton(hand: &Hand, res: Resolution, cmds: &mut Vec<DrawCommand>) {
    let px = |lm: Landmark| res.to_pixel(lm.x(), lm.y());

    for (a, b) in CONNECTIVITY {
        cmds.push(DrawCommand::Line {
            start: px(hand.landmark(*a)),
            end: px(hand.landmark(*b)),
            color: BONE_COLOR,
        });
    }
    for lm in hand.landmarks().iter() {
        let (x, y) = px(lm);
        cmds.push(DrawCommand::Marker {
            x,
            y,
            color: JOINT_COLOR,
        });
    }
}
