use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::value::Value;

/// Why an assignment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    /// No binding with that name exists anywhere on the chain.
    Undefined,

    /// The binding exists but was declared with `let`.
    Immutable,
}

/// One frame of the scope chain.
///
/// Each frame owns a name-to-value map plus the set of names declared mutable (`var` rather
/// than `let`). Frames are shared by `Rc` because closures capture their defining environment
/// and outlive the call that created it.
#[derive(Debug, Default)]
pub struct Environment {
    parent: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Value>,
    mutables: HashSet<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Rc<RefCell<Environment>>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Declares a binding in this frame, shadowing any previous one with the same name.
    pub fn declare(&mut self, name: String, value: Value, mutable: bool) {
        if mutable {
            self.mutables.insert(name.clone());
        } else {
            self.mutables.remove(&name);
        }
        self.values.insert(name, value);
    }

    /// Looks the name up, walking the parent chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Assigns to an existing binding, walking the parent chain to find it.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        if self.values.contains_key(name) {
            if !self.mutables.contains(name) {
                return Err(AssignError::Immutable);
            }
            self.values.insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(AssignError::Undefined),
        }
    }

    /// The frame exactly `distance` hops up the chain. The resolver guarantees the distance is
    /// in range; a short chain yields the root frame.
    fn ancestor(env: &Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut frame = Rc::clone(env);
        for _ in 0..distance {
            let parent = frame.borrow().parent.clone();
            match parent {
                Some(parent) => frame = parent,
                None => break,
            }
        }
        frame
    }

    /// Reads a name directly from the frame at the resolved distance.
    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Option<Value> {
        Self::ancestor(env, distance).borrow().values.get(name).cloned()
    }

    /// Writes a name directly into the frame at the resolved distance.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
    ) -> Result<(), AssignError> {
        let frame = Self::ancestor(env, distance);
        let mut frame = frame.borrow_mut();
        if !frame.values.contains_key(name) {
            return Err(AssignError::Undefined);
        }
        if !frame.mutables.contains(name) {
            return Err(AssignError::Immutable);
        }
        frame.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Every name visible from this frame, for "did you mean" suggestions.
    pub fn visible_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        if let Some(parent) = &self.parent {
            names.extend(parent.borrow().visible_names());
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immutable_bindings_reject_assignment() {
        let mut env = Environment::new();
        env.declare("x".to_string(), Value::Number(1.0), false);
        assert_eq!(
            env.assign("x", Value::Number(2.0)),
            Err(AssignError::Immutable)
        );
    }

    #[test]
    fn assignment_walks_the_chain() {
        let root = Rc::new(RefCell::new(Environment::new()));
        root.borrow_mut()
            .declare("x".to_string(), Value::Number(1.0), true);
        let mut child = Environment::with_parent(Rc::clone(&root));
        child.assign("x", Value::Number(5.0)).unwrap();
        assert_eq!(root.borrow().get("x"), Some(Value::Number(5.0)));
    }

    #[test]
    fn distance_writes_hit_the_right_frame() {
        let root = Rc::new(RefCell::new(Environment::new()));
        root.borrow_mut()
            .declare("x".to_string(), Value::Number(1.0), true);
        let child = Rc::new(RefCell::new(Environment::with_parent(Rc::clone(&root))));
        child
            .borrow_mut()
            .declare("x".to_string(), Value::Number(2.0), true);

        Environment::assign_at(&child, 1, "x", Value::Number(9.0)).unwrap();
        assert_eq!(root.borrow().get("x"), Some(Value::Number(9.0)));
        assert_eq!(Environment::get_at(&child, 0, "x"), Some(Value::Number(2.0)));
    }
}
