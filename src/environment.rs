use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A single scope frame: a mapping from names to values plus a handle to
/// the enclosing scope. The chain of frames is a tree by construction, a
/// frame's parent is fixed when the frame is created, so the reference
/// counts can never form a cycle.
#[derive(Debug, Clone)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    pub variables: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            variables: HashMap::new(),
        }
    }

    /// Binds a value to a name in this scope, shadowing any previous binding.
    pub fn define(&mut self, name: &str, value: Object) {
        self.variables.insert(name.to_string(), value);
    }

    /// Walks up the chain and returns the frame `distance` parents away.
    /// The resolver guarantees the frame exists.
    fn ancestor(&self, distance: usize) -> Rc<RefCell<Environment>> {
        let parent = self.enclosing.clone()
            .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", 1));
        let mut environment = Rc::clone(&parent);

        for i in 1..distance {
            let parent = environment.borrow().enclosing.clone()
                .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", i));
            environment = Rc::clone(&parent);
        }

        environment
    }

    /// Assigns a value to an existing name, searching the chain outwards.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &mut self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    /// Assigns a value to an existing name exactly `distance` frames up.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Object) {
        if distance > 0 {
            self.ancestor(distance).borrow_mut().variables.insert(name.lexeme.clone(), value);
        } else {
            self.variables.insert(name.lexeme.clone(), value);
        }
    }

    /// Looks up a name, searching the chain outwards.
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(variable) = self.variables.get(&name.lexeme) {
            return Ok(variable.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    /// Looks up a name exactly `distance` frames up.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        let variable = match distance > 0 {
            true => self.ancestor(distance).borrow().variables.get(&name.lexeme).cloned(),
            false => self.variables.get(&name.lexeme).cloned(),
        };

        variable.ok_or_else(|| RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::literal::Literal;

    fn name(lexeme: &str) -> Token {
        Token::from(lexeme)
    }

    #[test]
    fn define_and_get() {
        let mut environment = Environment::default();
        environment.define("a", Object::from(1.0));

        assert_eq!(environment.get(&name("a")).unwrap(), Object::from(1.0));
        assert!(environment.get(&name("b")).is_err());
    }

    #[test]
    fn get_walks_the_chain() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from("outer"));

        let child = Environment::new(Some(Rc::clone(&globals)));
        assert_eq!(child.get(&name("a")).unwrap(), Object::from("outer"));
    }

    #[test]
    fn assign_updates_the_declaring_scope() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from(1.0));

        let mut child = Environment::new(Some(Rc::clone(&globals)));
        child.assign(&name("a"), Object::from(2.0)).unwrap();

        assert_eq!(globals.borrow().get(&name("a")).unwrap(), Object::from(2.0));
    }

    #[test]
    fn assign_to_undefined_is_an_error() {
        let mut environment = Environment::default();
        assert!(environment.assign(&name("missing"), Object::from(1.0)).is_err());
    }

    #[test]
    fn get_at_reads_the_requested_frame() {
        let root = Rc::new(RefCell::new(Environment::default()));
        root.borrow_mut().define("a", Object::from("root"));

        let middle = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&root)))));
        middle.borrow_mut().define("a", Object::from("middle"));

        let leaf = Environment::new(Some(Rc::clone(&middle)));

        assert_eq!(leaf.get_at(1, &name("a")).unwrap(), Object::from("middle"));
        assert_eq!(leaf.get_at(2, &name("a")).unwrap(), Object::from("root"));
    }

    #[test]
    fn assign_at_writes_the_requested_frame() {
        let root = Rc::new(RefCell::new(Environment::default()));
        root.borrow_mut().define("a", Object::from("root"));

        let mut leaf = Environment::new(Some(Rc::clone(&root)));
        leaf.define("a", Object::from("leaf"));
        leaf.assign_at(1, &name("a"), Object::from("changed"));

        assert_eq!(root.borrow().get(&name("a")).unwrap(), Object::from("changed"));
        assert_eq!(leaf.get_at(0, &name("a")).unwrap(), Object::from("leaf"));
    }

    #[test]
    fn shadowing_does_not_touch_the_parent() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from(Literal::Number(1.0)));

        let mut child = Environment::new(Some(Rc::clone(&globals)));
        child.define("a", Object::from(Literal::Number(2.0)));

        assert_eq!(child.get(&name("a")).unwrap(), Object::from(2.0));
        assert_eq!(globals.borrow().get(&name("a")).unwrap(), Object::from(1.0));
    }
}
