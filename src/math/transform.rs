use std::collections::HashMap;

use arrayvec::ArrayVec;

use crate::Float;

use super::Mat4;

/// Maximum number of entries on the transform stack; 127 pushes above the
/// base entry are allowed.
pub const MAX_TRANSFORM_STACK: usize = 128;

/// A pair of row-major matrices capturing the current transform at the
/// shutter-open and shutter-close times. Directives between
/// `ActiveTransform StartTime` and `ActiveTransform All` only touch the
/// start matrix, and vice versa for `EndTime`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub start: Mat4,
    pub end: Mat4,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        start: Mat4::IDENTITY,
        end: Mat4::IDENTITY,
    };

    /// Inverts both time samples. `None` if either matrix is singular.
    pub fn inverse(&self) -> Option<Transform> {
        Some(Transform {
            start: self.start.inverse()?,
            end: self.end.inverse()?,
        })
    }
}

/// The current-transform stack. Each entry holds the start/end matrix pair;
/// the `active` flags gate which of the two matrices subsequent transform
/// directives update.
pub struct TransformStack {
    entries: ArrayVec<Transform, MAX_TRANSFORM_STACK>,
    pub active: [bool; 2],
    coordinate_systems: HashMap<String, Transform>,
}

impl Default for TransformStack {
    fn default() -> TransformStack {
        TransformStack::new()
    }
}

impl TransformStack {
    pub fn new() -> TransformStack {
        let mut entries = ArrayVec::new();
        entries.push(Transform::IDENTITY);
        TransformStack {
            entries,
            active: [true, true],
            coordinate_systems: HashMap::new(),
        }
    }

    pub fn top(&self) -> &Transform {
        self.entries.last().unwrap()
    }

    fn top_mut(&mut self) -> &mut Transform {
        self.entries.last_mut().unwrap()
    }

    /// Duplicates the top entry. Returns false when the stack is full.
    pub fn push(&mut self) -> bool {
        if self.entries.is_full() {
            return false;
        }
        let top = *self.top();
        self.entries.push(top);
        true
    }

    /// Removes the top entry. Returns false when only the base remains.
    pub fn pop(&mut self) -> bool {
        if self.entries.len() == 1 {
            return false;
        }
        self.entries.pop();
        true
    }

    /// Resets to a single identity entry, leaving named coordinate systems
    /// and the active flags alone.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.entries.push(Transform::IDENTITY);
    }

    fn apply(&mut self, f: impl Fn(&mut Mat4)) {
        let active = self.active;
        let top = self.top_mut();
        if active[0] {
            f(&mut top.start);
        }
        if active[1] {
            f(&mut top.end);
        }
    }

    pub fn identity(&mut self) {
        self.apply(|m| m.identity());
    }

    pub fn translate(&mut self, v: [Float; 3]) {
        self.apply(|m| m.translate(v));
    }

    pub fn scale(&mut self, v: [Float; 3]) {
        self.apply(|m| m.scale(v));
    }

    pub fn rotate(&mut self, angle_degrees: Float, axis: [Float; 3]) {
        self.apply(|m| m.rotate(angle_degrees, axis));
    }

    pub fn look_at(&mut self, eye: [Float; 3], target: [Float; 3], up: [Float; 3]) {
        self.apply(|m| m.look_at(eye, target, up));
    }

    /// Replaces the active matrices outright.
    pub fn transform(&mut self, m: Mat4) {
        self.apply(|dst| *dst = m);
    }

    /// Right-multiplies onto the active matrices.
    pub fn concat_transform(&mut self, m: Mat4) {
        self.apply(|dst| dst.concat(&m));
    }

    /// Snapshots the current top under `name`, replacing any previous
    /// snapshot with that name.
    pub fn coordinate_system(&mut self, name: &str) {
        let top = *self.top();
        self.coordinate_systems.insert(name.to_string(), top);
    }

    /// Replaces the top with a previously saved snapshot. Returns false if
    /// the name was never defined.
    pub fn coord_sys_transform(&mut self, name: &str) -> bool {
        match self.coordinate_systems.get(name) {
            Some(saved) => {
                *self.top_mut() = *saved;
                true
            }
            None => false,
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn push_duplicates_and_pop_restores() {
        let mut stack = TransformStack::new();
        stack.translate([1.0, 2.0, 3.0]);
        assert!(stack.push());
        stack.translate([10.0, 0.0, 0.0]);
        assert_abs_diff_eq!(stack.top().start.rows[0][3], 11.0);
        assert!(stack.pop());
        assert_abs_diff_eq!(stack.top().start.rows[0][3], 1.0);
    }

    #[test]
    fn pop_past_base_fails() {
        let mut stack = TransformStack::new();
        assert!(!stack.pop());
    }

    #[test]
    fn push_past_capacity_fails() {
        let mut stack = TransformStack::new();
        for _ in 0..(MAX_TRANSFORM_STACK - 1) {
            assert!(stack.push());
        }
        assert!(!stack.push());
    }

    #[test]
    fn active_flags_gate_updates() {
        let mut stack = TransformStack::new();
        stack.active = [true, false];
        stack.translate([5.0, 0.0, 0.0]);
        assert_abs_diff_eq!(stack.top().start.rows[0][3], 5.0);
        assert_abs_diff_eq!(stack.top().end.rows[0][3], 0.0);

        stack.active = [false, true];
        stack.translate([0.0, 7.0, 0.0]);
        assert_abs_diff_eq!(stack.top().start.rows[1][3], 0.0);
        assert_abs_diff_eq!(stack.top().end.rows[1][3], 7.0);
    }

    #[test]
    fn coordinate_system_round_trip() {
        let mut stack = TransformStack::new();
        stack.translate([1.0, 0.0, 0.0]);
        stack.coordinate_system("saved");
        stack.identity();
        assert!(stack.coord_sys_transform("saved"));
        assert_abs_diff_eq!(stack.top().start.rows[0][3], 1.0);
        assert!(!stack.coord_sys_transform("never-defined"));
    }

    #[test]
    fn clear_resets_to_single_identity() {
        let mut stack = TransformStack::new();
        stack.push();
        stack.translate([4.0, 0.0, 0.0]);
        stack.clear();
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.top(), Transform::IDENTITY);
    }
}
