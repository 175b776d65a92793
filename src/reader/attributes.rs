//! The attribute stack: scoped graphics state for materials, area lights,
//! mediums and orientation, plus the per-scope name lists that give
//! textures and materials lexical shadowing.

use arrayvec::ArrayVec;

use crate::{Index, INVALID_INDEX};

pub const MAX_ATTRIBUTE_STACK: usize = 128;

#[derive(Debug, Clone)]
pub struct AttributeFrame {
    pub active_material: Index,
    pub area_light: Index,
    pub inside_medium: Index,
    pub outside_medium: Index,
    pub reverse_orientation: bool,

    /// Indices of float textures defined in this scope, in definition
    /// order.
    pub float_textures: Vec<Index>,
    /// Indices of spectrum textures defined in this scope.
    pub spectrum_textures: Vec<Index>,
    /// Indices of named materials defined in this scope.
    pub materials: Vec<Index>,
}

impl Default for AttributeFrame {
    fn default() -> AttributeFrame {
        AttributeFrame {
            active_material: INVALID_INDEX,
            area_light: INVALID_INDEX,
            inside_medium: INVALID_INDEX,
            outside_medium: INVALID_INDEX,
            reverse_orientation: false,
            float_textures: Vec::new(),
            spectrum_textures: Vec::new(),
            materials: Vec::new(),
        }
    }
}

pub struct AttributeStack {
    frames: ArrayVec<AttributeFrame, MAX_ATTRIBUTE_STACK>,
}

impl Default for AttributeStack {
    fn default() -> AttributeStack {
        AttributeStack::new()
    }
}

impl AttributeStack {
    pub fn new() -> AttributeStack {
        let mut frames = ArrayVec::new();
        frames.push(AttributeFrame::default());
        AttributeStack { frames }
    }

    pub fn top(&self) -> &AttributeFrame {
        self.frames.last().unwrap()
    }

    pub fn top_mut(&mut self) -> &mut AttributeFrame {
        self.frames.last_mut().unwrap()
    }

    /// Pushes a new scope. The scalar state carries over; the name lists
    /// start empty so definitions in the new scope shadow outer ones
    /// without leaking back out.
    pub fn push(&mut self) -> bool {
        if self.frames.is_full() {
            return false;
        }
        let top = self.top();
        let frame = AttributeFrame {
            active_material: top.active_material,
            area_light: top.area_light,
            inside_medium: top.inside_medium,
            outside_medium: top.outside_medium,
            reverse_orientation: top.reverse_orientation,
            float_textures: Vec::new(),
            spectrum_textures: Vec::new(),
            materials: Vec::new(),
        };
        self.frames.push(frame);
        true
    }

    pub fn pop(&mut self) -> bool {
        if self.frames.len() == 1 {
            return false;
        }
        self.frames.pop();
        true
    }

    /// Drops every pushed scope and resets the base frame's scalar state.
    /// The base frame's name lists survive, so textures and materials
    /// defined in the preamble stay referenceable inside the world
    /// section.
    pub fn clear(&mut self) {
        while self.frames.len() > 1 {
            self.frames.pop();
        }
        let base = self.top_mut();
        base.active_material = INVALID_INDEX;
        base.area_light = INVALID_INDEX;
        base.inside_medium = INVALID_INDEX;
        base.outside_medium = INVALID_INDEX;
        base.reverse_orientation = false;
    }

    /// Frames from the innermost scope outward, for shadowing-aware name
    /// resolution.
    pub fn frames_innermost_first(&self) -> impl Iterator<Item = &AttributeFrame> {
        self.frames.iter().rev()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_carries_scalars_but_not_name_lists() {
        let mut stack = AttributeStack::new();
        stack.top_mut().active_material = 3;
        stack.top_mut().reverse_orientation = true;
        stack.top_mut().materials.push(3);

        assert!(stack.push());
        assert_eq!(stack.top().active_material, 3);
        assert!(stack.top().reverse_orientation);
        assert!(stack.top().materials.is_empty());
    }

    #[test]
    fn pop_restores_outer_scope() {
        let mut stack = AttributeStack::new();
        stack.push();
        stack.top_mut().active_material = 7;
        assert!(stack.pop());
        assert_eq!(stack.top().active_material, INVALID_INDEX);
        assert!(!stack.pop());
    }

    #[test]
    fn capacity_is_bounded() {
        let mut stack = AttributeStack::new();
        for _ in 0..(MAX_ATTRIBUTE_STACK - 1) {
            assert!(stack.push());
        }
        assert!(!stack.push());
    }
}
