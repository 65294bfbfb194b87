#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use gitlab_vars_lib::{AppError, ProjectScope, Variable, VariableGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(String),
    Update(String),
    Delete(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Update,
    Delete,
}

/// In-memory stand-in for a project's variable store.
///
/// Variables are identified by `(key, environment_scope)` like on GitLab.
/// Masked variables refuse in-place updates.
#[derive(Default)]
pub struct FakeGitLab {
    vars: RefCell<Vec<Variable>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<Vec<(Op, String)>>,
    fail_list: Cell<bool>,
}

impl FakeGitLab {
    pub fn with_vars(vars: Vec<Variable>) -> Self {
        let fake = Self::default();
        *fake.vars.borrow_mut() = vars;
        fake
    }

    pub fn fail_on(&self, op: Op, key: &str) {
        self.failures.borrow_mut().push((op, key.to_string()));
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_list.set(fail);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| *c != Call::List)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn vars(&self) -> Vec<Variable> {
        self.vars.borrow().clone()
    }

    pub fn get(&self, key: &str) -> Option<Variable> {
        self.vars.borrow().iter().find(|v| v.key == key).cloned()
    }

    fn injected(&self, op: Op, key: &str) -> Result<(), AppError> {
        if self
            .failures
            .borrow()
            .iter()
            .any(|(o, k)| *o == op && k == key)
        {
            return Err(AppError::Remote {
                operation: format!("{op:?}").to_lowercase(),
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn position(&self, key: &str, scope: &str) -> Option<usize> {
        self.vars
            .borrow()
            .iter()
            .position(|v| v.key == key && v.environment_scope == scope)
    }
}

fn not_found(operation: &str) -> AppError {
    AppError::Remote {
        operation: operation.to_string(),
        status: 404,
        body: "404 Variable Not Found".to_string(),
    }
}

impl VariableGateway for FakeGitLab {
    fn list_variables(&self, _scope: &ProjectScope) -> Result<Vec<Variable>, AppError> {
        self.calls.borrow_mut().push(Call::List);
        if self.fail_list.get() {
            return Err(AppError::Http("connection refused".to_string()));
        }
        Ok(self.vars())
    }

    fn create_variable(&self, _scope: &ProjectScope, variable: &Variable) -> Result<(), AppError> {
        self.calls
            .borrow_mut()
            .push(Call::Create(variable.key.clone()));
        self.injected(Op::Create, &variable.key)?;
        if self
            .position(&variable.key, &variable.environment_scope)
            .is_some()
        {
            return Err(AppError::Remote {
                operation: "create variable".to_string(),
                status: 400,
                body: format!("{} has already been taken", variable.key),
            });
        }
        self.vars.borrow_mut().push(variable.clone());
        Ok(())
    }

    fn update_variable(&self, _scope: &ProjectScope, variable: &Variable) -> Result<(), AppError> {
        self.calls
            .borrow_mut()
            .push(Call::Update(variable.key.clone()));
        self.injected(Op::Update, &variable.key)?;
        let index = self
            .position(&variable.key, &variable.environment_scope)
            .ok_or_else(|| not_found("update variable"))?;
        let mut vars = self.vars.borrow_mut();
        if vars[index].masked {
            return Err(AppError::Remote {
                operation: "update variable".to_string(),
                status: 400,
                body: "masked variables cannot be updated".to_string(),
            });
        }
        vars[index] = variable.clone();
        Ok(())
    }

    fn delete_variable(
        &self,
        _scope: &ProjectScope,
        key: &str,
        environment_scope: &str,
    ) -> Result<(), AppError> {
        self.calls
            .borrow_mut()
            .push(Call::Delete(key.to_string(), environment_scope.to_string()));
        self.injected(Op::Delete, key)?;
        let index = self
            .position(key, environment_scope)
            .ok_or_else(|| not_found("delete variable"))?;
        self.vars.borrow_mut().remove(index);
        Ok(())
    }
}

pub fn scope() -> ProjectScope {
    ProjectScope::new("work", "42")
}

pub fn var(key: &str, value: &str) -> Variable {
    Variable::new(key, value)
}

pub fn masked_var(key: &str, value: &str) -> Variable {
    let mut v = Variable::new(key, value);
    v.masked = true;
    v.protected = true;
    v
}

pub fn scoped_var(key: &str, value: &str, environment_scope: &str) -> Variable {
    let mut v = Variable::new(key, value);
    v.environment_scope = environment_scope.to_string();
    v
}
